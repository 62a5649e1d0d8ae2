use rayon::prelude::*;

use super::config::PrimalDualConfig;
use super::primal_dual::{solve, PrimalDualOutcome};
use crate::error::Result;
use crate::model::GridProblem;

/// Solves `problem` once per configuration, in parallel.
///
/// Solves share nothing mutable, so each result is exactly what a sequential
/// [`solve`] with the same configuration returns. Results keep the order of
/// `configs`.
pub fn solve_sweep(
    problem: &GridProblem,
    configs: &[PrimalDualConfig],
) -> Vec<Result<PrimalDualOutcome>> {
    configs
        .par_iter()
        .map(|config| solve(problem, config))
        .collect()
}
