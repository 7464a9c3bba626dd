//! Criterion benchmarks for u-tlink.
//!
//! Uses synthetic timelines: nodes are ordered, arcs only point forward,
//! and confidences lean towards BEFORE with random noise on the rest.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_tlink::algebra::{CompositionTable, RELATION_COUNT};
use u_tlink::graph::{find_triples, find_triples_naive, ArcCatalog, ArcRecord};
use u_tlink::ilp::{SimpleIlpSolver, SolverConfig};
use u_tlink::labeler::{BuildConfig, LabelerConfig, ProblemBuilder, TemporalLabeler};

fn random_timeline(nodes: usize, density: f64, seed: u64) -> ArcCatalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::new();
    for i in 0..nodes {
        for j in (i + 1)..nodes {
            if !rng.random_bool(density) {
                continue;
            }
            let mut confidence: Vec<f64> =
                (0..RELATION_COUNT).map(|_| rng.random_range(0.0..0.3)).collect();
            confidence[0] += 0.5;
            records.push(ArcRecord::new(format!("t{i}"), format!("t{j}"), confidence));
        }
    }
    // Pairs are generated once each, so no duplicate keys.
    ArcCatalog::build(records).unwrap()
}

// ===========================================================================
// Triple discovery
// ===========================================================================

fn bench_triples(c: &mut Criterion) {
    let mut group = c.benchmark_group("triples");
    group.sample_size(20);

    for nodes in [20, 60] {
        let catalog = random_timeline(nodes, 0.3, 42);
        group.bench_with_input(BenchmarkId::new("indexed", nodes), &catalog, |b, cat| {
            b.iter(|| black_box(find_triples(cat)))
        });
        group.bench_with_input(BenchmarkId::new("naive", nodes), &catalog, |b, cat| {
            b.iter(|| black_box(find_triples_naive(cat)))
        });
    }
    group.finish();
}

// ===========================================================================
// Model construction
// ===========================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    let table = CompositionTable::standard().unwrap();

    for nodes in [10, 30] {
        let catalog = random_timeline(nodes, 0.5, 7);
        let builder = ProblemBuilder::new(
            &table,
            BuildConfig::default()
                .without_max_constraints()
                .with_name_variables(false),
        );
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &catalog, |b, cat| {
            b.iter(|| black_box(builder.build(cat).unwrap()))
        });
    }
    group.finish();
}

// ===========================================================================
// End-to-end labeling with the reference solver
// ===========================================================================

fn bench_label(c: &mut Criterion) {
    let mut group = c.benchmark_group("label");
    group.sample_size(10);

    let labeler = TemporalLabeler::new(
        CompositionTable::standard().unwrap(),
        LabelerConfig::default()
            .with_build(BuildConfig::default().with_name_variables(false))
            .with_solver(SolverConfig::default().with_node_limit(200_000)),
    )
    .unwrap();
    let solver = SimpleIlpSolver::new();

    for nodes in [4, 6] {
        let catalog = random_timeline(nodes, 0.6, 3);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &catalog, |b, cat| {
            b.iter(|| black_box(labeler.run(cat, &solver).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_triples, bench_build, bench_label);
criterion_main!(benches);
