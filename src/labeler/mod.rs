//! Temporal relation labeling as a 0/1 program.
//!
//! Builds one binary variable per arc and relation type, maximizes total
//! confidence subject to one relation per arc and to the composition rules
//! on every connected triple, then decodes the solver's assignment back
//! into labels.
//!
//! # Key Components
//!
//! - **Builder**: [`ProblemBuilder`] — emits variables, objective,
//!   uniqueness and transitivity rows; reports [`ConstraintCounts`]
//! - **Decoder**: [`Decoder`] — solver values to [`LabeledArc`]s
//! - **Pipeline**: [`TemporalLabeler`] — prepare, solve, decode
//! - **Configuration**: [`LabelerConfig`], [`BuildConfig`]
//!
//! # References
//!
//! Chambers & Jurafsky (2008), "Jointly Combining Implicit Constraints
//! Improves Temporal Ordering"
//!
//! Do, Lu & Roth (2012), "Joint Inference for Event Timeline Construction"

mod builder;
mod config;
mod decoder;
mod runner;

pub use builder::{ConstraintCounts, LabelingProblem, ModelSizeWarning, ProblemBuilder};
pub use config::{BuildConfig, LabelerConfig};
pub use decoder::{Decoded, Decoder, LabeledArc};
pub use runner::{Labeling, TemporalLabeler};
