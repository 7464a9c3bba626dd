//! Relation algebra over temporal intervals.
//!
//! Defines the eight [`RelationType`]s and the [`CompositionTable`] that
//! answers, for `i R1 j` and `j R2 k`, which relations `i R3 k` remain
//! possible.
//!
//! # Key Components
//!
//! - [`RelationType`]: symbolic relation bound to a stable index `0..8`
//! - [`RelationSet`]: bitmask set of relations
//! - [`Composite`]: a permitted set, or the distinct unconstrained case
//! - [`CompositionTable`]: total, validated 8×8 lookup
//!
//! # References
//!
//! Allen (1983), "Maintaining Knowledge about Temporal Intervals"

mod relation;
mod table;

pub use relation::{RelationSet, RelationType, RELATION_COUNT};
pub use table::{Composite, CompositionTable, STANDARD_COMPOSITIONS, UNCONSTRAINED_CODE};
