//! Flow-conservation constraints on occupancy measures.
//!
//! For every non-goal state `s`:
//!
//! ```text
//! sum_a x(s, a) - sum_{s', a'} P(s | s', a') x(s', a') = 1{s = start}
//! ```
//!
//! Inflow is summed over non-goal origins only. The goal has no row: mass
//! that reaches it leaves the system.

use ndarray::{Array1, Array2, ArrayView1};

use super::indexing::StateActionIndex;
use super::problem::GridProblem;
use crate::env::{slip_transitions, Cell};

/// The linear system `A x = b` whose non-negative solutions (with the goal
/// actions at zero) are exactly the occupancy measures from start to goal.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSystem {
    /// `m x n` constraint matrix, one row per non-goal state.
    pub a: Array2<f64>,
    /// Start indicator over the rows of `a`.
    pub b: Array1<f64>,
    rows: Vec<Cell>,
}

impl FlowSystem {
    pub fn build(problem: &GridProblem, index: &StateActionIndex) -> Self {
        let goal = problem.goal();
        let rows: Vec<Cell> = index
            .states()
            .iter()
            .copied()
            .filter(|&cell| cell != goal)
            .collect();

        // Row of each state by linear index; the goal has none.
        let mut row_of = vec![None; index.states().len()];
        for (i, &cell) in rows.iter().enumerate() {
            if let Some(state) = problem.bounds().linear_index(cell) {
                row_of[state] = Some(i);
            }
        }

        let mut a = Array2::zeros((rows.len(), index.len()));
        let mut b = Array1::zeros(rows.len());

        for (i, &cell) in rows.iter().enumerate() {
            if let Some(columns) = index.action_indices(cell) {
                for k in columns {
                    a[[i, k]] += 1.0;
                }
            }
            b[i] = if cell == problem.start() { 1.0 } else { 0.0 };
        }

        for (k, &(origin, action)) in index.pairs().iter().enumerate() {
            if origin == goal {
                continue;
            }
            let dist = slip_transitions(
                origin,
                action,
                problem.slip(),
                problem.bounds(),
                Some(goal),
            );
            for (dest, p) in dist.iter() {
                let row = problem
                    .bounds()
                    .linear_index(dest)
                    .and_then(|state| row_of[state]);
                if let Some(i) = row {
                    a[[i, k]] -= p;
                }
            }
        }

        Self { a, b, rows }
    }

    /// Non-goal states in row order.
    pub fn rows(&self) -> &[Cell] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.a.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.a.ncols()
    }

    /// `A x - b`.
    pub fn residual(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        self.a.dot(&x) - &self.b
    }
}
