use super::costs::CostGrids;
use crate::env::{Cell, GridBounds};
use crate::error::{Error, Result};

/// A validated planning instance: grid, start, goal, slip and cost grids.
///
/// Everything that can be rejected as a configuration error is rejected here,
/// before any solve starts.
#[derive(Debug, Clone, PartialEq)]
pub struct GridProblem {
    bounds: GridBounds,
    start: Cell,
    goal: Cell,
    slip: f64,
    costs: CostGrids,
}

impl GridProblem {
    /// The grid dimensions are taken from the cost grids.
    pub fn new(costs: CostGrids, start: Cell, goal: Cell, slip: f64) -> Result<Self> {
        let (n_rows, n_cols) = costs.dim();
        let bounds = GridBounds::new(n_rows, n_cols)?;
        bounds.check(start, "start")?;
        bounds.check(goal, "goal")?;
        if !(0.0..=1.0).contains(&slip) {
            return Err(Error::InvalidSlip(slip));
        }
        Ok(Self {
            bounds,
            start,
            goal,
            slip,
            costs,
        })
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn slip(&self) -> f64 {
        self.slip
    }

    pub fn costs(&self) -> &CostGrids {
        &self.costs
    }
}
