//! 0/1 integer linear program definition.

use crate::error::{Error, Result};
use std::fmt;

/// Handle of a binary variable inside an [`IlpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// A binary decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryVar {
    /// Diagnostic name. May be empty; variables are addressed by [`VarId`].
    pub name: String,
    /// Fixed value, if any.
    pub fixed: Option<bool>,
}

impl BinaryVar {
    /// Creates a free binary variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed: None,
        }
    }

    /// Creates an unnamed free binary variable.
    pub fn anonymous() -> Self {
        Self::new(String::new())
    }

    /// Creates a variable fixed to `value`.
    pub fn fixed(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            fixed: Some(value),
        }
    }
}

/// Relation between a constraint's left-hand side and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `Σ a·x ≤ rhs`
    LessEq,
    /// `Σ a·x = rhs`
    Equal,
    /// `Σ a·x ≥ rhs`
    GreaterEq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::LessEq => "<=",
            Sense::Equal => "=",
            Sense::GreaterEq => ">=",
        })
    }
}

/// A linear constraint `Σ coef·x (sense) rhs`.
///
/// Terms on the same variable are merged when added through
/// [`add_term`](Self::add_term); a merged coefficient of zero removes the
/// term.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Diagnostic name. May be empty.
    pub name: String,
    /// `(variable, coefficient)` pairs.
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Creates a constraint with no terms.
    pub fn new(name: impl Into<String>, sense: Sense, rhs: f64) -> Self {
        Self {
            name: name.into(),
            terms: Vec::new(),
            sense,
            rhs,
        }
    }

    /// Adds `coef · var`, merging with an existing term on `var`.
    pub fn add_term(&mut self, var: VarId, coef: f64) {
        if let Some(pos) = self.terms.iter().position(|(v, _)| *v == var) {
            self.terms[pos].1 += coef;
            if self.terms[pos].1 == 0.0 {
                self.terms.remove(pos);
            }
        } else if coef != 0.0 {
            self.terms.push((var, coef));
        }
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Coefficient on `var` (0 when absent).
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| c)
            .sum()
    }

    /// Left-hand side value under `values` (indexed by [`VarId`]).
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(v, c)| c * values[v.0]).sum()
    }

    /// Whether `values` satisfies this constraint within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.activity(values);
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + tolerance,
            Sense::Equal => (lhs - self.rhs).abs() <= tolerance,
            Sense::GreaterEq => lhs >= self.rhs - tolerance,
        }
    }
}

/// Linear objective over binary variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    /// Maximize `Σ coef·x`.
    Maximize {
        /// (variable, coefficient) pairs.
        terms: Vec<(VarId, f64)>,
    },

    /// Minimize `Σ coef·x`.
    Minimize {
        /// (variable, coefficient) pairs.
        terms: Vec<(VarId, f64)>,
    },
}

impl Objective {
    pub fn terms(&self) -> &[(VarId, f64)] {
        match self {
            Objective::Maximize { terms } | Objective::Minimize { terms } => terms,
        }
    }

    pub fn is_maximize(&self) -> bool {
        matches!(self, Objective::Maximize { .. })
    }

    /// Objective value under `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms().iter().map(|(v, c)| c * values[v.0]).sum()
    }
}

/// A 0/1 integer linear program.
///
/// Contains binary variables, linear constraints, and an optional
/// objective. Solver-neutral: any [`IlpSolver`](super::IlpSolver) can
/// consume it.
///
/// # Examples
///
/// ```
/// use u_tlink::ilp::{BinaryVar, IlpModel, LinearConstraint, Objective, Sense};
///
/// let mut model = IlpModel::new("pick-one");
/// let a = model.add_var(BinaryVar::new("a"));
/// let b = model.add_var(BinaryVar::new("b"));
/// model.add_constraint(
///     LinearConstraint::new("one", Sense::Equal, 1.0)
///         .with_term(a, 1.0)
///         .with_term(b, 1.0),
/// );
/// model.set_objective(Objective::Maximize { terms: vec![(a, 0.3), (b, 0.7)] });
/// assert!(model.validate().is_ok());
/// assert_eq!(model.var_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IlpModel {
    /// Model name.
    pub name: String,
    /// Binary variables, addressed by position.
    pub vars: Vec<BinaryVar>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl IlpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a variable and returns its handle.
    pub fn add_var(&mut self, var: BinaryVar) -> VarId {
        self.vars.push(var);
        VarId(self.vars.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists and that all
    /// coefficients and right-hand sides are finite.
    pub fn validate(&self) -> Result<()> {
        let n = self.vars.len();
        let check_terms = |owner: &str, terms: &[(VarId, f64)]| -> Result<()> {
            for (var, coef) in terms {
                if var.0 >= n {
                    return Err(Error::InvalidModel(format!(
                        "{owner}: undefined variable #{}",
                        var.0
                    )));
                }
                if !coef.is_finite() {
                    return Err(Error::InvalidModel(format!(
                        "{owner}: non-finite coefficient on #{}",
                        var.0
                    )));
                }
            }
            Ok(())
        };

        for (i, constraint) in self.constraints.iter().enumerate() {
            let owner = if constraint.name.is_empty() {
                format!("constraint #{i}")
            } else {
                format!("constraint {}", constraint.name)
            };
            check_terms(&owner, &constraint.terms)?;
            if !constraint.rhs.is_finite() {
                return Err(Error::InvalidModel(format!("{owner}: non-finite rhs")));
            }
        }
        if let Some(objective) = &self.objective {
            check_terms("objective", objective.terms())?;
        }
        Ok(())
    }

    /// Returns the number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `values` satisfies every constraint and fixed variable.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.vars.len()
            && self.vars.iter().zip(values).all(|(var, &x)| match var.fixed {
                Some(b) => (x - if b { 1.0 } else { 0.0 }).abs() <= tolerance,
                None => true,
            })
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(values, tolerance))
    }

    /// Objective value under `values` (0 without an objective).
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .as_ref()
            .map_or(0.0, |objective| objective.evaluate(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let mut model = IlpModel::new("test");
        let a = model.add_var(BinaryVar::new("a"));
        let b = model.add_var(BinaryVar::anonymous());
        model.add_constraint(
            LinearConstraint::new("c", Sense::LessEq, 1.0)
                .with_term(a, 1.0)
                .with_term(b, 1.0),
        );
        model.set_objective(Objective::Maximize {
            terms: vec![(a, 1.0)],
        });

        assert_eq!(a, VarId(0));
        assert_eq!(b, VarId(1));
        assert_eq!(model.var_count(), 2);
        assert_eq!(model.constraint_count(), 1);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_terms_merge() {
        let c = LinearConstraint::new("c", Sense::LessEq, 1.0)
            .with_term(VarId(0), 1.0)
            .with_term(VarId(1), 1.0)
            .with_term(VarId(1), -1.0)
            .with_term(VarId(0), 2.0);
        assert_eq!(c.terms, vec![(VarId(0), 3.0)]);
        assert_eq!(c.coefficient(VarId(1)), 0.0);
    }

    #[test]
    fn test_undefined_variable() {
        let mut model = IlpModel::new("test");
        model.add_constraint(LinearConstraint::new("c", Sense::Equal, 1.0).with_term(VarId(3), 1.0));
        assert!(matches!(model.validate(), Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_non_finite_objective() {
        let mut model = IlpModel::new("test");
        let a = model.add_var(BinaryVar::new("a"));
        model.set_objective(Objective::Minimize {
            terms: vec![(a, f64::INFINITY)],
        });
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_feasibility_and_objective() {
        let mut model = IlpModel::new("test");
        let a = model.add_var(BinaryVar::new("a"));
        let b = model.add_var(BinaryVar::fixed("b", false));
        model.add_constraint(
            LinearConstraint::new("one", Sense::Equal, 1.0)
                .with_term(a, 1.0)
                .with_term(b, 1.0),
        );
        model.set_objective(Objective::Maximize {
            terms: vec![(a, 0.25), (b, 4.0)],
        });

        assert!(model.is_feasible(&[1.0, 0.0], 1e-9));
        assert!(!model.is_feasible(&[0.0, 1.0], 1e-9)); // b is fixed
        assert!(!model.is_feasible(&[1.0, 1.0], 1e-9));
        assert!(!model.is_feasible(&[1.0], 1e-9));
        assert_eq!(model.objective_value(&[1.0, 0.0]), 0.25);
    }

    #[test]
    fn test_sense_display() {
        assert_eq!(Sense::LessEq.to_string(), "<=");
        assert_eq!(Sense::GreaterEq.to_string(), ">=");
    }
}
