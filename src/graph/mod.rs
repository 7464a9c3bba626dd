//! Interval graph: arcs, the arc catalog and connected-triple discovery.
//!
//! # Key Components
//!
//! - [`ArcRecord`]: raw input row `(source, target, confidence vector)`
//! - [`ArcCatalog`]: validated, read-only arc collection
//! - [`ConnectedTriple`]: chain `i -> j -> k` whose closure `i -> k` exists
//! - [`find_triples`]: node-indexed triple discovery

mod arc;
mod catalog;
mod triples;

pub use arc::{Arc, ArcKey, ArcRecord, IntervalId};
pub use catalog::{ArcCatalog, ArcIdx};
pub use triples::{find_triples, find_triples_naive, ConnectedTriple};
