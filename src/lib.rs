//! Globally consistent temporal-relation labeling.
//!
//! Given directed arcs between temporal intervals, each carrying a
//! confidence vector over eight relation types, picks one relation per arc
//! so that total confidence is maximal and every chain `i -> j -> k` with a
//! closing arc `i -> k` obeys the composition table.
//!
//! - **Algebra**: relation types and the 8×8 composition table, validated
//!   for completeness at construction.
//! - **Graph**: arc records, the validated arc catalog and connected-triple
//!   discovery (node-indexed, optionally parallel).
//! - **ILP**: a solver-neutral 0/1 linear program, the [`ilp::IlpSolver`]
//!   contract and a small reference branch-and-bound.
//! - **Labeler**: model construction with constraint counts, result
//!   decoding and the end-to-end [`labeler::TemporalLabeler`].
//!
//! # Architecture
//!
//! The pipeline is a single synchronous batch: table → catalog → triples →
//! model → solver → decoder. The composition table is the only long-lived
//! state and is read-only once built. Time limits and cancellation belong
//! to the solver through [`ilp::SolverConfig`]; the core performs no
//! retries. Logging goes through `tracing`; no subscriber is installed.

pub mod algebra;
pub mod error;
pub mod graph;
pub mod ilp;
pub mod labeler;

pub use error::{Error, Result};
