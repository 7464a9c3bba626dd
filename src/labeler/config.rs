//! Labeler configuration.
//!
//! [`BuildConfig`] controls model construction; [`LabelerConfig`] bundles
//! it with the solver and decoder settings for a whole run.

use crate::error::{Error, Result};
use crate::ilp::SolverConfig;

/// Configuration for building the labeling model.
///
/// # Defaults
///
/// ```
/// use u_tlink::labeler::BuildConfig;
///
/// let config = BuildConfig::default();
/// assert_eq!(config.max_constraints, Some(1_000_000));
/// assert!(!config.abort_on_oversize);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Ceiling on uniqueness + transitivity constraints.
    ///
    /// Exceeding it produces a [`ModelSizeWarning`](super::ModelSizeWarning).
    /// `None` disables the check.
    pub max_constraints: Option<usize>,

    /// Fail with [`Error::ModelTooLarge`] instead of warning when the
    /// ceiling is exceeded. The check runs before any constraint is built.
    pub abort_on_oversize: bool,

    /// Give variables and constraints readable names such as
    /// `x[e1,e2,BEFORE]`. Useful when exporting the model to an external
    /// solver; costs one string per variable and constraint.
    pub name_variables: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_constraints: Some(1_000_000),
            abort_on_oversize: false,
            name_variables: true,
        }
    }
}

impl BuildConfig {
    /// Sets the constraint ceiling.
    pub fn with_max_constraints(mut self, n: usize) -> Self {
        self.max_constraints = Some(n);
        self
    }

    /// Disables the constraint ceiling.
    pub fn without_max_constraints(mut self) -> Self {
        self.max_constraints = None;
        self
    }

    /// Abort instead of warning on oversized models.
    pub fn with_abort_on_oversize(mut self, abort: bool) -> Self {
        self.abort_on_oversize = abort;
        self
    }

    /// Enables or disables diagnostic names.
    pub fn with_name_variables(mut self, named: bool) -> Self {
        self.name_variables = named;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_constraints == Some(0) {
            return Err(Error::InvalidConfig(
                "max_constraints must be positive or None".into(),
            ));
        }
        if self.abort_on_oversize && self.max_constraints.is_none() {
            return Err(Error::InvalidConfig(
                "abort_on_oversize requires max_constraints".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a complete labeling run.
///
/// # Builder Pattern
///
/// ```
/// use u_tlink::ilp::SolverConfig;
/// use u_tlink::labeler::{BuildConfig, LabelerConfig};
///
/// let config = LabelerConfig::default()
///     .with_build(BuildConfig::default().with_max_constraints(50_000))
///     .with_solver(SolverConfig::default().with_time_limit_ms(5_000))
///     .with_keep_confidences(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct LabelerConfig {
    /// Model construction settings.
    pub build: BuildConfig,

    /// Passed through to the solver adapter.
    pub solver: SolverConfig,

    /// Distance from 1 (or from the per-arc maximum) within which a solved
    /// value counts as selected (or as tied).
    pub decode_tolerance: f64,

    /// Copy each arc's input confidence vector into the output.
    pub keep_confidences: bool,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            solver: SolverConfig::default(),
            decode_tolerance: 1e-6,
            keep_confidences: true,
        }
    }
}

impl LabelerConfig {
    /// Sets the build configuration.
    pub fn with_build(mut self, build: BuildConfig) -> Self {
        self.build = build;
        self
    }

    /// Sets the solver configuration.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the decode tolerance.
    pub fn with_decode_tolerance(mut self, tolerance: f64) -> Self {
        self.decode_tolerance = tolerance;
        self
    }

    /// Keeps or drops input confidences in the output.
    pub fn with_keep_confidences(mut self, keep: bool) -> Self {
        self.keep_confidences = keep;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.build.validate()?;
        self.solver.validate()?;
        if !(self.decode_tolerance >= 0.0 && self.decode_tolerance < 0.5) {
            return Err(Error::InvalidConfig(
                "decode_tolerance must be in [0, 0.5)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LabelerConfig::default();
        assert_eq!(config.build, BuildConfig::default());
        assert_eq!(config.decode_tolerance, 1e-6);
        assert!(config.keep_confidences);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ceiling() {
        let config = BuildConfig::default().with_max_constraints(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_abort_without_ceiling() {
        let config = BuildConfig::default()
            .without_max_constraints()
            .with_abort_on_oversize(true);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_decode_tolerance() {
        assert!(LabelerConfig::default()
            .with_decode_tolerance(0.5)
            .validate()
            .is_err());
        assert!(LabelerConfig::default()
            .with_decode_tolerance(-1e-3)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_propagates_solver_errors() {
        let config =
            LabelerConfig::default().with_solver(SolverConfig::default().with_time_limit_ms(0));
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
