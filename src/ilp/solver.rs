//! ILP solver interface.

use super::model::{IlpModel, VarId};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not proven optimal) incumbent found, e.g. after a
    /// time limit.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Limit reached before any feasible solution was found.
    Timeout,
    /// Cancelled before any feasible solution was found.
    Cancelled,
    /// The solver failed for another reason.
    Error,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Feasible => "feasible",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::ModelInvalid => "model invalid",
            SolverStatus::Timeout => "timeout",
            SolverStatus::Cancelled => "cancelled",
            SolverStatus::Error => "error",
        })
    }
}

/// Solution from an ILP solver.
#[derive(Debug, Clone, PartialEq)]
pub struct IlpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if a solution was found).
    pub objective_value: Option<f64>,
    /// Variable values indexed by [`VarId`]. Empty without a solution.
    pub values: Vec<f64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Search nodes explored, when the solver reports it.
    pub nodes: u64,
    /// Diagnostic message from the solver.
    pub message: Option<String>,
}

impl IlpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
            nodes: 0,
            message: None,
        }
    }

    /// Creates an empty solution carrying a diagnostic message.
    pub fn failed(status: SolverStatus, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(status)
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value of `var`, if present.
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.0).copied()
    }
}

/// Solver configuration.
///
/// Limits and cancellation belong to the solver; when one triggers after
/// an incumbent exists, the solver reports [`SolverStatus::Feasible`].
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds. `None` disables the limit.
    pub time_limit_ms: Option<u64>,
    /// Maximum number of search nodes. `None` disables the limit.
    pub node_limit: Option<u64>,
    /// Numeric tolerance for constraint checks.
    pub tolerance: f64,
    /// External cancellation flag, polled during search.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: Some(60_000),
            node_limit: None,
            tolerance: 1e-9,
            cancel: None,
        }
    }
}

impl SolverConfig {
    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes the time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    /// Sets the search node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Sets the numeric tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Attaches a cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the cancellation flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.time_limit_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        if self.node_limit == Some(0) {
            return Err(Error::InvalidConfig("node_limit must be positive or None".into()));
        }
        if !(self.tolerance >= 0.0 && self.tolerance < 0.5) {
            return Err(Error::InvalidConfig(
                "tolerance must be in [0, 0.5)".into(),
            ));
        }
        Ok(())
    }
}

/// Trait for 0/1 ILP solver implementations.
///
/// Implementors provide the actual search. This can wrap external solvers
/// (CBC, HiGHS, Gurobi, possibly in a separate process) or the bundled
/// [`SimpleIlpSolver`](super::SimpleIlpSolver). The call blocks until the
/// solver returns; limits in [`SolverConfig`] bound how long.
pub trait IlpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &IlpModel, config: &SolverConfig) -> IlpSolution;
}

impl<S: IlpSolver + ?Sized> IlpSolver for &S {
    fn solve(&self, model: &IlpModel, config: &SolverConfig) -> IlpSolution {
        (**self).solve(model, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, Some(60_000));
        assert_eq!(config.node_limit, None);
        assert!(!config.is_cancelled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_solver_config_validation() {
        assert!(SolverConfig::default().with_time_limit_ms(0).validate().is_err());
        assert!(SolverConfig::default().with_node_limit(0).validate().is_err());
        assert!(SolverConfig::default().with_tolerance(-1.0).validate().is_err());
        assert!(SolverConfig::default().with_tolerance(f64::NAN).validate().is_err());
        assert!(SolverConfig::default().without_time_limit().validate().is_ok());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let config = SolverConfig::default().with_cancel_flag(flag.clone());
        assert!(!config.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(config.is_cancelled());
    }

    #[test]
    fn test_solution_helpers() {
        let mut solution = IlpSolution::empty(SolverStatus::Feasible);
        solution.values = vec![0.0, 1.0];
        assert!(solution.is_solution_found());
        assert_eq!(solution.value(VarId(1)), Some(1.0));
        assert_eq!(solution.value(VarId(2)), None);

        let failed = IlpSolution::failed(SolverStatus::Error, "boom");
        assert!(!failed.is_solution_found());
        assert_eq!(failed.message.as_deref(), Some("boom"));
    }
}
