use bargaining::env::Cell;
use bargaining::model::{CostGrids, FlowSystem, GridProblem, StateActionIndex};
use bargaining::qp::{InteriorPointSolver, QpSolver, QuadraticProgram};
use bargaining::solver::{solve, solve_sweep, PrimalDualConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;

/// Square grid with random positive costs, start top-left, goal bottom-right.
fn random_problem(size: usize, seed: u64) -> GridProblem {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = || {
        let mut g = Array2::from_shape_fn((size, size), |_| rng.gen_range(0.5..2.0));
        g[[size - 1, size - 1]] = 0.0;
        g
    };
    let costs = CostGrids::new(grid(), grid(), grid()).unwrap();
    GridProblem::new(costs, Cell::new(0, 0), Cell::new(size - 1, size - 1), 0.1).unwrap()
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    let solver = InteriorPointSolver::default();

    for size in [3, 5, 7] {
        let problem = random_problem(size, 42);
        let index = StateActionIndex::new(*problem.bounds());
        let flow = FlowSystem::build(&problem, &index);
        let pinned: Vec<usize> = index
            .action_indices(problem.goal())
            .map(|k| k.to_vec())
            .unwrap_or_default();
        let point = Array1::from_elem(index.len(), -0.01);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let program = QuadraticProgram::projection(
                    point.view(),
                    flow.a.view(),
                    flow.b.view(),
                    &pinned,
                );
                black_box(solver.solve(&program).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_primal_dual(c: &mut Criterion) {
    let mut group = c.benchmark_group("primal_dual");
    group.sample_size(10);
    let config = PrimalDualConfig::default().with_max_iterations(20);

    for size in [3, 5] {
        let problem = random_problem(size, 7);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(solve(&problem, &config).unwrap()))
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let problem = random_problem(4, 11);
    let configs: Vec<PrimalDualConfig> = [1.0, 2.0, 3.0, 4.0]
        .into_iter()
        .map(|energy| PrimalDualConfig::default().with_budgets(energy, 3.0).with_max_iterations(20))
        .collect();

    let mut group = c.benchmark_group("sweep");
    group.sample_size(10);
    group.bench_function("four_budgets", |b| {
        b.iter(|| black_box(solve_sweep(&problem, &configs)))
    });
    group.finish();
}

criterion_group!(benches, bench_projection, bench_primal_dual, bench_sweep);
criterion_main!(benches);
