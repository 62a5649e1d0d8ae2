//! Budget-constrained planning on a slippery gridworld.
//!
//! A route from start to goal is chosen by optimizing over occupancy
//! measures: the expected, undiscounted number of times each state-action
//! pair is used before the goal absorbs. Price is minimized while energy and time budgets are enforced
//! softly by a projected primal-dual loop whose multipliers also relax the
//! budgets they price.
//!
//! ```no_run
//! use bargaining::env::Cell;
//! use bargaining::model::{CostGrids, GridProblem};
//! use bargaining::solver::{solve, PrimalDualConfig, RunSummary};
//! use ndarray::array;
//!
//! let grid = array![[1.0, 1.0], [1.0, 0.0]];
//! let costs = CostGrids::new(grid.clone(), grid.clone(), grid).unwrap();
//! let problem = GridProblem::new(costs, Cell::new(0, 0), Cell::new(1, 1), 0.1).unwrap();
//! let config = PrimalDualConfig::default();
//! let outcome = solve(&problem, &config).unwrap();
//! println!("{}", RunSummary::new(&outcome, &config));
//! ```

pub mod env;
pub mod error;
pub mod model;
pub mod qp;
pub mod solver;

pub use env::{Action, Cell};
pub use error::{Error, Result};
pub use model::{CostGrids, GridProblem, Policy};
pub use solver::{solve, solve_sweep, PrimalDualConfig, PrimalDualOutcome, RunSummary};
