//! Landing-cost grids and their reduction to per-pair expected costs.

use ndarray::{Array1, Array2};

use super::indexing::StateActionIndex;
use super::problem::GridProblem;
use crate::env::{slip_transitions, Cell};
use crate::error::{Error, Result};

/// Price, energy and time charged for landing on each cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CostGrids {
    pub price: Array2<f64>,
    pub energy: Array2<f64>,
    pub time: Array2<f64>,
}

impl CostGrids {
    /// Bundles three grids, checking that they share a shape and hold only
    /// finite values.
    pub fn new(price: Array2<f64>, energy: Array2<f64>, time: Array2<f64>) -> Result<Self> {
        let expected = price.dim();
        for (name, grid) in [("price", &price), ("energy", &energy), ("time", &time)] {
            if grid.dim() != expected {
                return Err(Error::CostGridShape {
                    name,
                    actual: grid.dim(),
                    expected,
                });
            }
            if let Some(((row, col), _)) = grid.indexed_iter().find(|(_, v)| !v.is_finite()) {
                return Err(Error::NonFiniteCost { name, row, col });
            }
        }
        Ok(Self {
            price,
            energy,
            time,
        })
    }

    /// `(n_rows, n_cols)` shared by all three grids.
    pub fn dim(&self) -> (usize, usize) {
        self.price.dim()
    }

    fn at(&self, cell: Cell) -> [f64; 3] {
        let ix = (cell.row, cell.col);
        [self.price[ix], self.energy[ix], self.time[ix]]
    }
}

/// Expected one-step costs `c`, `e`, `t`, one entry per state-action pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CostVectors {
    pub price: Array1<f64>,
    pub energy: Array1<f64>,
    pub time: Array1<f64>,
}

impl CostVectors {
    /// Expected landing cost of every pair under the slip kernel. Mass that
    /// lands on the goal is charged nothing.
    pub fn build(problem: &GridProblem, index: &StateActionIndex) -> Self {
        let n = index.len();
        let mut price = Array1::zeros(n);
        let mut energy = Array1::zeros(n);
        let mut time = Array1::zeros(n);

        for (k, &(cell, action)) in index.pairs().iter().enumerate() {
            let dist = slip_transitions(
                cell,
                action,
                problem.slip(),
                problem.bounds(),
                Some(problem.goal()),
            );
            let mut expected = [0.0; 3];
            for (dest, p) in dist.iter().filter(|(dest, _)| *dest != problem.goal()) {
                for (acc, cost) in expected.iter_mut().zip(problem.costs().at(dest)) {
                    *acc += p * cost;
                }
            }
            price[k] = expected[0];
            energy[k] = expected[1];
            time[k] = expected[2];
        }

        Self {
            price,
            energy,
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Action;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn problem(slip: f64) -> GridProblem {
        let costs = CostGrids::new(
            array![[1.0, 2.0], [3.0, 0.0]],
            array![[10.0, 20.0], [30.0, 0.0]],
            array![[0.5, 0.5], [0.5, 0.5]],
        )
        .unwrap();
        GridProblem::new(costs, Cell::new(0, 0), Cell::new(1, 1), slip).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        let err = CostGrids::new(
            Array2::zeros((2, 2)),
            Array2::zeros((2, 3)),
            Array2::zeros((2, 2)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::CostGridShape {
                name: "energy",
                actual: (2, 3),
                expected: (2, 2)
            }
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = CostGrids::new(
            Array2::zeros((2, 2)),
            Array2::zeros((2, 2)),
            array![[0.0, f64::NAN], [0.0, 0.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::NonFiniteCost {
                name: "time",
                row: 0,
                col: 1
            }
        );
    }

    #[test]
    fn test_deterministic_costs_are_landing_costs() {
        let problem = problem(0.0);
        let index = StateActionIndex::new(*problem.bounds());
        let costs = CostVectors::build(&problem, &index);

        let k = index.index_of(Cell::new(0, 0), Action::Right).unwrap();
        assert_abs_diff_eq!(costs.price[k], 2.0);
        assert_abs_diff_eq!(costs.energy[k], 20.0);

        // Bouncing off the wall charges the origin cell again.
        let k = index.index_of(Cell::new(0, 0), Action::Up).unwrap();
        assert_abs_diff_eq!(costs.price[k], 1.0);
    }

    #[test]
    fn test_goal_landing_is_free() {
        let problem = problem(0.0);
        let index = StateActionIndex::new(*problem.bounds());
        let costs = CostVectors::build(&problem, &index);

        let k = index.index_of(Cell::new(0, 1), Action::Down).unwrap();
        assert_abs_diff_eq!(costs.price[k], 0.0);
        assert_abs_diff_eq!(costs.time[k], 0.0);

        for action in Action::ALL {
            let k = index.index_of(Cell::new(1, 1), action).unwrap();
            assert_abs_diff_eq!(costs.price[k], 0.0);
            assert_abs_diff_eq!(costs.energy[k], 0.0);
            assert_abs_diff_eq!(costs.time[k], 0.0);
        }
    }

    #[test]
    fn test_slip_costs_exclude_goal_mass() {
        // From (0, 1) heading down with slip 0.2: 0.8 reaches the goal (free),
        // 0.1 slips right into the wall (stays on (0, 1)), 0.1 slips left
        // onto (0, 0).
        let problem = problem(0.2);
        let index = StateActionIndex::new(*problem.bounds());
        let costs = CostVectors::build(&problem, &index);

        let k = index.index_of(Cell::new(0, 1), Action::Down).unwrap();
        assert_abs_diff_eq!(costs.price[k], 0.1 * 2.0 + 0.1 * 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(costs.energy[k], 0.1 * 20.0 + 0.1 * 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(costs.time[k], 0.2 * 0.5, epsilon = 1e-12);
    }
}
