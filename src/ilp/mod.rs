//! 0/1 integer linear programming layer.
//!
//! Provides a solver-neutral model for binary programs with linear
//! equality/inequality constraints and a linear objective.
//!
//! # Key Components
//!
//! - **Variables**: [`BinaryVar`], addressed by [`VarId`]
//! - **Constraints**: [`LinearConstraint`] with a [`Sense`]
//! - **Model**: [`IlpModel`] — container for variables, constraints, objective
//! - **Solver**: [`IlpSolver`] trait — interface for solver implementations
//!
//! # Design
//!
//! This module defines the modeling layer and the solver contract. The
//! bundled [`SimpleIlpSolver`] is an exact but naive branch-and-bound meant
//! for tests and small instances; production runs plug an external solver
//! (CBC, HiGHS, ...) in through [`IlpSolver`].
//!
//! # References
//!
//! Wolsey (1998), "Integer Programming"

mod branch_bound;
mod model;
mod solver;

pub use branch_bound::SimpleIlpSolver;
pub use model::{BinaryVar, IlpModel, LinearConstraint, Objective, Sense, VarId};
pub use solver::{IlpSolution, IlpSolver, SolverConfig, SolverStatus};
