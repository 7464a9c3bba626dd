//! Labeling pipeline.
//!
//! build catalog → find triples → build model → solve → decode.

use super::builder::{ConstraintCounts, LabelingProblem, ModelSizeWarning, ProblemBuilder};
use super::config::LabelerConfig;
use super::decoder::{Decoder, LabeledArc};
use crate::algebra::{CompositionTable, RelationType};
use crate::error::{Error, Result};
use crate::graph::{ArcCatalog, ArcKey, ArcRecord};
use crate::ilp::{IlpSolver, SolverStatus};

/// Result of a labeling run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Labeling {
    /// One label per arc, in catalog order.
    pub labels: Vec<LabeledArc>,

    /// Total confidence of the chosen labels.
    pub objective_value: f64,

    /// `false` when the solver stopped at a limit with an incumbent.
    pub optimal: bool,

    /// Status reported by the solver.
    pub status: SolverStatus,

    /// Model sizes.
    pub counts: ConstraintCounts,

    /// Set when the model exceeded the configured ceiling.
    pub size_warning: Option<ModelSizeWarning>,

    /// Arcs whose solved values needed repair during decoding.
    pub repaired: Vec<ArcKey>,

    /// Solver wall time in milliseconds.
    pub solve_time_ms: u64,
}

impl Labeling {
    /// Relation chosen for `source -> target`, if that arc was labeled.
    pub fn relation(&self, source: &str, target: &str) -> Option<RelationType> {
        self.labels
            .iter()
            .find(|l| l.source.as_str() == source && l.target.as_str() == target)
            .map(|l| l.relation)
    }
}

/// Assigns globally consistent relation labels to an arc catalog.
///
/// The composition table and configuration are fixed at construction and
/// shared read-only by every run.
///
/// # Examples
///
/// ```
/// use u_tlink::algebra::RelationType;
/// use u_tlink::graph::ArcRecord;
/// use u_tlink::ilp::SimpleIlpSolver;
/// use u_tlink::labeler::TemporalLabeler;
///
/// let labeler = TemporalLabeler::standard().unwrap();
/// let labeling = labeler
///     .label_records(
///         vec![
///             ArcRecord::new("a", "b", vec![0.8, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1]),
///             ArcRecord::new("b", "c", vec![0.9, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0, 0.05]),
///             ArcRecord::new("a", "c", vec![0.2, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.3]),
///         ],
///         &SimpleIlpSolver::new(),
///     )
///     .unwrap();
///
/// // BEFORE then BEFORE forces BEFORE on (a, c).
/// assert_eq!(labeling.relation("a", "c"), Some(RelationType::Before));
/// assert!(labeling.optimal);
/// ```
#[derive(Debug, Clone)]
pub struct TemporalLabeler {
    table: CompositionTable,
    config: LabelerConfig,
}

impl TemporalLabeler {
    /// Creates a labeler after validating `config`.
    pub fn new(table: CompositionTable, config: LabelerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { table, config })
    }

    /// Standard TLINK table with default configuration.
    pub fn standard() -> Result<Self> {
        Self::new(CompositionTable::standard()?, LabelerConfig::default())
    }

    pub fn table(&self) -> &CompositionTable {
        &self.table
    }

    pub fn config(&self) -> &LabelerConfig {
        &self.config
    }

    /// Builds the model without solving it.
    ///
    /// Constraint counts and any size warning are available on the result
    /// before the solver runs.
    pub fn prepare<'a>(&self, catalog: &'a ArcCatalog) -> Result<LabelingProblem<'a>> {
        ProblemBuilder::new(&self.table, self.config.build.clone()).build(catalog)
    }

    /// Solves a prepared problem and decodes the labels.
    pub fn solve<S: IlpSolver>(
        &self,
        problem: &LabelingProblem<'_>,
        solver: &S,
    ) -> Result<Labeling> {
        let counts = problem.counts();
        let solution = solver.solve(problem.model(), &self.config.solver);
        tracing::debug!(
            status = %solution.status,
            nodes = solution.nodes,
            solve_time_ms = solution.solve_time_ms,
            "solver returned"
        );

        match solution.status {
            SolverStatus::Optimal => {}
            SolverStatus::Feasible => {
                tracing::warn!(
                    message = solution.message.as_deref().unwrap_or(""),
                    "solver returned a non-optimal incumbent"
                );
            }
            SolverStatus::Infeasible => return Err(Error::Infeasible { counts }),
            status => {
                return Err(Error::Solver {
                    status,
                    message: solution
                        .message
                        .clone()
                        .unwrap_or_else(|| status.to_string()),
                    counts,
                })
            }
        }

        let decoded = Decoder::new(self.config.decode_tolerance)
            .with_confidences(self.config.keep_confidences)
            .decode(problem, &solution.values)?;
        let objective_value = solution
            .objective_value
            .unwrap_or_else(|| problem.model().objective_value(&solution.values));
        let optimal = solution.status == SolverStatus::Optimal;

        tracing::info!(
            arcs = decoded.labels.len(),
            objective = objective_value,
            optimal,
            "labeling complete"
        );

        Ok(Labeling {
            labels: decoded.labels,
            objective_value,
            optimal,
            status: solution.status,
            counts,
            size_warning: problem.size_warning(),
            repaired: decoded.repaired,
            solve_time_ms: solution.solve_time_ms,
        })
    }

    /// Builds, solves and decodes in one call.
    pub fn run<S: IlpSolver>(&self, catalog: &ArcCatalog, solver: &S) -> Result<Labeling> {
        let problem = self.prepare(catalog)?;
        self.solve(&problem, solver)
    }

    /// Validates `records` into a catalog, then runs.
    pub fn label_records<I, S>(&self, records: I, solver: &S) -> Result<Labeling>
    where
        I: IntoIterator<Item = ArcRecord>,
        S: IlpSolver,
    {
        let catalog = ArcCatalog::build(records)?;
        self.run(&catalog, solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Composite, RELATION_COUNT};
    use crate::error::ArcIssue;
    use crate::graph::find_triples;
    use crate::ilp::{IlpModel, IlpSolution, SimpleIlpSolver, SolverConfig};
    use crate::labeler::BuildConfig;
    use proptest::prelude::*;
    use RelationType::{After, Before, Contains, EndsOn, Overlap};

    fn labeler() -> TemporalLabeler {
        TemporalLabeler::standard().unwrap()
    }

    /// Always returns the same solution.
    struct FixedSolver(IlpSolution);

    impl IlpSolver for FixedSolver {
        fn solve(&self, _model: &IlpModel, _config: &SolverConfig) -> IlpSolution {
            self.0.clone()
        }
    }

    fn one_hot(relations: &[RelationType]) -> Vec<f64> {
        let mut values = vec![0.0; relations.len() * RELATION_COUNT];
        for (i, r) in relations.iter().enumerate() {
            values[i * RELATION_COUNT + r.index()] = 1.0;
        }
        values
    }

    #[test]
    fn test_single_arc_objective() {
        let labeling = labeler()
            .label_records(
                vec![ArcRecord::new(
                    "a",
                    "b",
                    vec![0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.9],
                )],
                &SimpleIlpSolver::new(),
            )
            .unwrap();
        assert_eq!(labeling.labels.len(), 1);
        assert_eq!(labeling.labels[0].relation, RelationType::None);
        assert!((labeling.objective_value - 0.9).abs() < 1e-12);
        assert!(labeling.optimal);
        assert_eq!(labeling.status, SolverStatus::Optimal);
        assert!(labeling.repaired.is_empty());
    }

    #[test]
    fn test_pinned_contradiction_is_infeasible() {
        let err = labeler()
            .label_records(
                vec![
                    ArcRecord::pinned("i", "j", Before),
                    ArcRecord::pinned("j", "k", Before),
                    ArcRecord::pinned("i", "k", After),
                ],
                &SimpleIlpSolver::new(),
            )
            .unwrap_err();
        match err {
            Error::Infeasible { counts } => {
                assert_eq!(counts.uniqueness, 3);
                assert_eq!(counts.triples, 1);
                assert_eq!(counts.transitivity, 46);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transitivity_overrides_local_confidence() {
        let labeling = labeler()
            .label_records(
                vec![
                    ArcRecord::pinned("i", "j", Before),
                    ArcRecord::pinned("j", "k", Before),
                    ArcRecord::certain("i", "k", After),
                ],
                &SimpleIlpSolver::new(),
            )
            .unwrap();
        assert_eq!(labeling.relation("i", "k"), Some(Before));
        assert!((labeling.objective_value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_exposes_counts_before_solving() {
        let labeler = TemporalLabeler::new(
            CompositionTable::standard().unwrap(),
            LabelerConfig::default().with_build(BuildConfig::default().with_max_constraints(5)),
        )
        .unwrap();
        let catalog = ArcCatalog::build(vec![
            ArcRecord::certain("a", "b", Before),
            ArcRecord::certain("b", "c", Before),
            ArcRecord::certain("a", "c", Before),
        ])
        .unwrap();

        let problem = labeler.prepare(&catalog).unwrap();
        assert_eq!(problem.counts().total(), 49);
        let warning = problem.size_warning().unwrap();
        assert_eq!(warning.ceiling, 5);

        let labeling = labeler.solve(&problem, &SimpleIlpSolver::new()).unwrap();
        assert_eq!(labeling.size_warning, Some(warning));
        assert_eq!(labeling.counts, problem.counts());
    }

    #[test]
    fn test_invalid_record_aborts_before_solving() {
        let err = labeler()
            .label_records(
                vec![ArcRecord::new("a", "b", vec![0.5; 4])],
                &FixedSolver(IlpSolution::failed(SolverStatus::Error, "not reached")),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArc {
                issue: ArcIssue::VectorLength { got: 4 },
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = TemporalLabeler::new(
            CompositionTable::standard().unwrap(),
            LabelerConfig::default().with_decode_tolerance(0.7),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_solver_error_propagates() {
        let catalog = ArcCatalog::build(vec![ArcRecord::certain("a", "b", After)]).unwrap();
        let solver = FixedSolver(IlpSolution::failed(SolverStatus::Error, "process exited"));
        match labeler().run(&catalog, &solver).unwrap_err() {
            Error::Solver {
                status,
                message,
                counts,
            } => {
                assert_eq!(status, SolverStatus::Error);
                assert_eq!(message, "process exited");
                assert_eq!(counts.uniqueness, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_without_incumbent_is_error() {
        let catalog = ArcCatalog::build(vec![ArcRecord::certain("a", "b", After)]).unwrap();
        let solver = FixedSolver(IlpSolution::empty(SolverStatus::Timeout));
        assert!(matches!(
            labeler().run(&catalog, &solver),
            Err(Error::Solver {
                status: SolverStatus::Timeout,
                ..
            })
        ));
    }

    #[test]
    fn test_incumbent_flagged_non_optimal() {
        let catalog = ArcCatalog::build(vec![
            ArcRecord::certain("a", "b", After),
            ArcRecord::certain("b", "c", Overlap),
        ])
        .unwrap();
        let mut solution = IlpSolution::empty(SolverStatus::Feasible);
        solution.values = one_hot(&[After, Contains]);
        solution.message = Some("time limit".into());

        let labeling = labeler().run(&catalog, &FixedSolver(solution)).unwrap();
        assert!(!labeling.optimal);
        assert_eq!(labeling.status, SolverStatus::Feasible);
        assert_eq!(labeling.relation("b", "c"), Some(Contains));
        // Objective recomputed from the values when the solver omits it.
        assert!((labeling.objective_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_assignment_rejected() {
        let catalog = ArcCatalog::build(vec![ArcRecord::certain("a", "b", After)]).unwrap();
        let mut solution = IlpSolution::empty(SolverStatus::Optimal);
        solution.values = vec![0.0, 1.0];
        assert!(matches!(
            labeler().run(&catalog, &FixedSolver(solution)),
            Err(Error::AssignmentLength {
                expected: 8,
                got: 2
            })
        ));
    }

    #[test]
    fn test_confidences_dropped_on_request() {
        let labeler = TemporalLabeler::new(
            CompositionTable::standard().unwrap(),
            LabelerConfig::default().with_keep_confidences(false),
        )
        .unwrap();
        let labeling = labeler
            .label_records(
                vec![ArcRecord::certain("a", "b", EndsOn)],
                &SimpleIlpSolver::new(),
            )
            .unwrap();
        assert_eq!(labeling.labels[0].confidence, None);
        assert_eq!(labeling.labels[0].values[EndsOn.index()], 1.0);
    }

    fn confidence() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0..1.0f64, RELATION_COUNT)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Without triples every arc takes its own best relation.
        #[test]
        fn prop_star_graph_takes_per_arc_maximum(
            vectors in prop::collection::vec(confidence(), 1..6),
        ) {
            let records: Vec<ArcRecord> = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| ArcRecord::new("hub", format!("leaf{i}"), v.clone()))
                .collect();
            let labeling = labeler()
                .label_records(records, &SimpleIlpSolver::new())
                .unwrap();
            prop_assert_eq!(labeling.counts.triples, 0);

            let mut expected_objective = 0.0;
            for (label, v) in labeling.labels.iter().zip(&vectors) {
                let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!((v[label.relation.index()] - max).abs() < 1e-12);
                expected_objective += max;
            }
            prop_assert!((labeling.objective_value - expected_objective).abs() < 1e-9);
        }

        /// Solved labelings pick one relation per arc and satisfy every
        /// composition rule on every connected triple.
        #[test]
        fn prop_labels_are_unique_and_transitive(
            arcs in prop::collection::btree_map(
                (0usize..4, 0usize..4).prop_filter("no loops", |(a, b)| a != b),
                confidence(),
                1..8,
            ),
        ) {
            let records: Vec<ArcRecord> = arcs
                .iter()
                .map(|(&(s, t), v)| ArcRecord::new(format!("n{s}"), format!("n{t}"), v.clone()))
                .collect();
            let labeler = TemporalLabeler::new(
                CompositionTable::standard().unwrap(),
                LabelerConfig::default()
                    .with_solver(SolverConfig::default().with_node_limit(500_000)),
            )
            .unwrap();
            let catalog = ArcCatalog::build(records).unwrap();
            let labeling = labeler.run(&catalog, &SimpleIlpSolver::new()).unwrap();

            prop_assert_eq!(labeling.labels.len(), catalog.len());
            for label in &labeling.labels {
                let chosen = label.values.iter().filter(|&&v| v == 1.0).count();
                prop_assert_eq!(chosen, 1);
                prop_assert_eq!(label.values[label.relation.index()], 1.0);
            }

            let relation = |idx: crate::graph::ArcIdx| labeling.labels[idx.0].relation;
            for triple in find_triples(&catalog) {
                let (r1, r2, r3) = (relation(triple.ij), relation(triple.jk), relation(triple.ik));
                match labeler.table().lookup(r1, r2) {
                    Composite::Unconstrained => {}
                    Composite::Permitted(set) => prop_assert!(
                        set.contains(r3),
                        "{r1} then {r2} does not permit {r3}"
                    ),
                }
            }
        }
    }
}
