//! Dense state-action indexing.
//!
//! Pairs are ordered outer over cells (row-major) and inner over
//! [`Action::ALL`], so the index of `(cell, action)` is
//! `4 * linear_index(cell) + action.index()`.

use crate::env::{Action, Cell, GridBounds};

/// Bijection between state-action pairs and positions in the occupancy
/// vector. Built from the grid bounds alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateActionIndex {
    bounds: GridBounds,
    states: Vec<Cell>,
    pairs: Vec<(Cell, Action)>,
}

impl StateActionIndex {
    pub fn new(bounds: GridBounds) -> Self {
        let states: Vec<Cell> = bounds.cells().collect();
        let pairs = states
            .iter()
            .flat_map(|&cell| Action::ALL.into_iter().map(move |action| (cell, action)))
            .collect();
        Self {
            bounds,
            states,
            pairs,
        }
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// All states in row-major order.
    pub fn states(&self) -> &[Cell] {
        &self.states
    }

    /// All state-action pairs in index order.
    pub fn pairs(&self) -> &[(Cell, Action)] {
        &self.pairs
    }

    /// Dimension of the occupancy vector.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Position of `(cell, action)`, or `None` for an off-grid cell.
    pub fn index_of(&self, cell: Cell, action: Action) -> Option<usize> {
        self.bounds
            .linear_index(cell)
            .map(|state| state * Action::ALL.len() + action.index())
    }

    pub fn pair(&self, index: usize) -> Option<(Cell, Action)> {
        self.pairs.get(index).copied()
    }

    /// Indices of the four pairs leaving `cell`, in action order.
    pub fn action_indices(&self, cell: Cell) -> Option<[usize; 4]> {
        self.bounds.linear_index(cell).map(|state| {
            let base = state * Action::ALL.len();
            [base, base + 1, base + 2, base + 3]
        })
    }
}
