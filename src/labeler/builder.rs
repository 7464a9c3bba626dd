//! Constraint and objective construction.
//!
//! Turns an [`ArcCatalog`] and a [`CompositionTable`] into a 0/1 program:
//!
//! - one binary `x[arc, r]` per arc and relation type
//! - objective `max Σ confidence[arc][r] · x[arc, r]`
//! - uniqueness `Σ_r x[arc, r] = 1` per arc
//! - transitivity, per connected triple `(i, j, k)` and relation pair
//!   `(r1, r2)` whose composite is constrained:
//!   `x[ij, r1] + x[jk, r2] - Σ_{r3 ∈ composite} x[ik, r3] <= 1`
//!
//! The transitivity row is the linear form of
//! `ij = r1 ∧ jk = r2 ⇒ ik ∈ composite`: with both premises at 1 the
//! closure sum must reach 1, otherwise the row is slack.

use super::config::BuildConfig;
use crate::algebra::{Composite, CompositionTable, RelationType, RELATION_COUNT};
use crate::error::{Error, Result};
use crate::graph::{find_triples, ArcCatalog, ArcIdx, ConnectedTriple};
use crate::ilp::{BinaryVar, IlpModel, LinearConstraint, Objective, Sense, VarId};
use std::fmt;

/// Sizes of a built labeling model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintCounts {
    /// Decision variables (arcs × 8).
    pub variables: usize,
    /// Connected triples found.
    pub triples: usize,
    /// One per arc.
    pub uniqueness: usize,
    /// Emitted transitivity rows.
    pub transitivity: usize,
    /// `(triple, r1, r2)` combinations skipped as unconstrained.
    pub skipped_unconstrained: usize,
}

impl ConstraintCounts {
    /// Uniqueness plus transitivity constraints.
    pub fn total(&self) -> usize {
        self.uniqueness + self.transitivity
    }
}

impl fmt::Display for ConstraintCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uniqueness + {} transitivity constraints over {} variables",
            self.uniqueness, self.transitivity, self.variables
        )
    }
}

/// The model would exceed the configured constraint ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelSizeWarning {
    /// Constraints the model has (or would have).
    pub constraints: usize,
    /// Configured ceiling.
    pub ceiling: usize,
}

impl fmt::Display for ModelSizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model has {} constraints, above the ceiling of {}",
            self.constraints, self.ceiling
        )
    }
}

/// A built labeling model tied to the catalog it was derived from.
#[derive(Debug, Clone)]
pub struct LabelingProblem<'a> {
    catalog: &'a ArcCatalog,
    model: IlpModel,
    counts: ConstraintCounts,
    size_warning: Option<ModelSizeWarning>,
}

impl<'a> LabelingProblem<'a> {
    /// Variable `x[arc, relation]`.
    pub fn var(&self, arc: ArcIdx, relation: RelationType) -> VarId {
        var_id(arc, relation)
    }

    pub fn catalog(&self) -> &'a ArcCatalog {
        self.catalog
    }

    /// The 0/1 program to hand to a solver.
    pub fn model(&self) -> &IlpModel {
        &self.model
    }

    pub fn counts(&self) -> ConstraintCounts {
        self.counts
    }

    /// Set when the model exceeds the configured ceiling.
    pub fn size_warning(&self) -> Option<ModelSizeWarning> {
        self.size_warning
    }
}

fn var_id(arc: ArcIdx, relation: RelationType) -> VarId {
    VarId(arc.0 * RELATION_COUNT + relation.index())
}

/// Builds [`LabelingProblem`]s from a fixed table and configuration.
///
/// # Examples
///
/// ```
/// use u_tlink::algebra::CompositionTable;
/// use u_tlink::graph::{ArcCatalog, ArcRecord};
/// use u_tlink::labeler::{BuildConfig, ProblemBuilder};
///
/// let table = CompositionTable::standard().unwrap();
/// let catalog = ArcCatalog::build(vec![
///     ArcRecord::new("a", "b", vec![0.125; 8]),
///     ArcRecord::new("b", "c", vec![0.125; 8]),
///     ArcRecord::new("a", "c", vec![0.125; 8]),
/// ])
/// .unwrap();
///
/// let problem = ProblemBuilder::new(&table, BuildConfig::default())
///     .build(&catalog)
///     .unwrap();
/// let counts = problem.counts();
/// assert_eq!(counts.uniqueness, 3);
/// assert_eq!(counts.triples, 1);
/// assert_eq!(counts.transitivity, table.constrained_pairs());
/// ```
pub struct ProblemBuilder<'t> {
    table: &'t CompositionTable,
    config: BuildConfig,
}

impl<'t> ProblemBuilder<'t> {
    pub fn new(table: &'t CompositionTable, config: BuildConfig) -> Self {
        Self { table, config }
    }

    /// Finds connected triples and builds the model.
    pub fn build<'a>(&self, catalog: &'a ArcCatalog) -> Result<LabelingProblem<'a>> {
        let triples = find_triples(catalog);
        self.build_with_triples(catalog, &triples)
    }

    /// Builds the model from precomputed triples.
    ///
    /// Counts are known before any row is created, so an oversized model
    /// is reported (or rejected, with `abort_on_oversize`) up front.
    pub fn build_with_triples<'a>(
        &self,
        catalog: &'a ArcCatalog,
        triples: &[ConnectedTriple],
    ) -> Result<LabelingProblem<'a>> {
        self.config.validate()?;

        let constrained = self.table.constrained_pairs();
        let pairs = RELATION_COUNT * RELATION_COUNT;
        let counts = ConstraintCounts {
            variables: catalog.len() * RELATION_COUNT,
            triples: triples.len(),
            uniqueness: catalog.len(),
            transitivity: triples.len() * constrained,
            skipped_unconstrained: triples.len() * (pairs - constrained),
        };

        tracing::info!(
            variables = counts.variables,
            triples = counts.triples,
            uniqueness = counts.uniqueness,
            transitivity = counts.transitivity,
            skipped = counts.skipped_unconstrained,
            "labeling model size"
        );

        let size_warning = self.check_size(&counts)?;

        let mut model = IlpModel::new("tlink");
        self.add_variables(&mut model, catalog);
        self.add_objective(&mut model, catalog);
        self.add_uniqueness(&mut model, catalog);
        let emitted = self.add_transitivity(&mut model, catalog, triples);
        debug_assert_eq!(emitted, counts.transitivity);

        Ok(LabelingProblem {
            catalog,
            model,
            counts,
            size_warning,
        })
    }

    fn check_size(&self, counts: &ConstraintCounts) -> Result<Option<ModelSizeWarning>> {
        let Some(ceiling) = self.config.max_constraints else {
            return Ok(None);
        };
        if counts.total() <= ceiling {
            return Ok(None);
        }
        let warning = ModelSizeWarning {
            constraints: counts.total(),
            ceiling,
        };
        if self.config.abort_on_oversize {
            return Err(Error::ModelTooLarge(warning));
        }
        tracing::warn!(
            constraints = warning.constraints,
            ceiling = warning.ceiling,
            "labeling model exceeds constraint ceiling"
        );
        Ok(Some(warning))
    }

    fn add_variables(&self, model: &mut IlpModel, catalog: &ArcCatalog) {
        for (_, arc) in catalog.iter() {
            for r in RelationType::ALL {
                let name = if self.config.name_variables {
                    format!("x[{},{},{}]", arc.key.source, arc.key.target, r)
                } else {
                    String::new()
                };
                let var = match arc.pinned {
                    Some(pinned) => BinaryVar::fixed(name, pinned == r),
                    None => BinaryVar::new(name),
                };
                model.add_var(var);
            }
        }
    }

    fn add_objective(&self, model: &mut IlpModel, catalog: &ArcCatalog) {
        let terms = catalog
            .iter()
            .flat_map(|(idx, arc)| {
                RelationType::ALL
                    .into_iter()
                    .map(move |r| (var_id(idx, r), arc.confidence[r.index()]))
            })
            .collect();
        model.set_objective(Objective::Maximize { terms });
    }

    fn add_uniqueness(&self, model: &mut IlpModel, catalog: &ArcCatalog) {
        for (idx, arc) in catalog.iter() {
            let name = if self.config.name_variables {
                format!("unique{}", arc.key)
            } else {
                String::new()
            };
            let mut row = LinearConstraint::new(name, Sense::Equal, 1.0);
            for r in RelationType::ALL {
                row.add_term(var_id(idx, r), 1.0);
            }
            model.add_constraint(row);
        }
    }

    fn add_transitivity(
        &self,
        model: &mut IlpModel,
        catalog: &ArcCatalog,
        triples: &[ConnectedTriple],
    ) -> usize {
        let mut emitted = 0;
        for triple in triples {
            for r1 in RelationType::ALL {
                for r2 in RelationType::ALL {
                    let Composite::Permitted(closure) = self.table.lookup(r1, r2) else {
                        continue;
                    };
                    let name = if self.config.name_variables {
                        let (i, j, k) = triple.nodes(catalog);
                        format!("trans[{i},{j},{k}|{r1},{r2}]")
                    } else {
                        String::new()
                    };
                    let mut row = LinearConstraint::new(name, Sense::LessEq, 1.0);
                    row.add_term(var_id(triple.ij, r1), 1.0);
                    row.add_term(var_id(triple.jk, r2), 1.0);
                    for r3 in closure.iter() {
                        row.add_term(var_id(triple.ik, r3), -1.0);
                    }
                    model.add_constraint(row);
                    emitted += 1;
                }
            }
        }
        emitted
    }
}
