//! Error types.

use crate::algebra::RelationType;
use crate::graph::{ArcKey, IntervalId};
use crate::ilp::SolverStatus;
use crate::labeler::{ConstraintCounts, ModelSizeWarning};

/// Result type alias for u-tlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an input arc record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArcIssue {
    #[error("duplicate arc key")]
    Duplicate,

    #[error("confidence vector has {got} entries, expected 8")]
    VectorLength { got: usize },

    #[error("confidence value at index {index} is not finite")]
    NonFiniteConfidence { index: usize },

    #[error("references unknown node {node}")]
    UnknownNode { node: IntervalId },
}

/// Errors raised while building, solving or decoding a labeling problem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Composition table incomplete or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A malformed arc record.
    #[error("invalid arc {arc}: {issue}")]
    InvalidArc { arc: ArcKey, issue: ArcIssue },

    /// The model exceeded the configured ceiling and aborting was requested.
    #[error("{0}")]
    ModelTooLarge(ModelSizeWarning),

    /// No assignment satisfies every constraint.
    #[error("no consistent labeling exists ({counts})")]
    Infeasible { counts: ConstraintCounts },

    /// The solver ended without a usable assignment.
    #[error("solver ended with status {status}: {message} ({counts})")]
    Solver {
        status: SolverStatus,
        message: String,
        counts: ConstraintCounts,
    },

    /// Solved values tie at the maximum for an arc.
    #[error("ambiguous assignment for arc {arc}: {candidates:?} tie at {value}")]
    DecodeAmbiguous {
        arc: ArcKey,
        candidates: Vec<RelationType>,
        value: f64,
    },

    /// The solver returned too few values.
    #[error("assignment has {got} values, model has {expected} variables")]
    AssignmentLength { expected: usize, got: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::InvalidArc {
            arc: ArcKey::new("e1", "e2"),
            issue: ArcIssue::VectorLength { got: 3 },
        };
        assert_eq!(
            err.to_string(),
            "invalid arc (e1 -> e2): confidence vector has 3 entries, expected 8"
        );

        let err = Error::DecodeAmbiguous {
            arc: ArcKey::new("a", "b"),
            candidates: vec![RelationType::Before, RelationType::After],
            value: 0.5,
        };
        assert!(err.to_string().contains("[Before, After] tie at 0.5"));
    }
}
