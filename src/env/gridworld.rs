//! Rectangular grid geometry: cells, the four movement actions and the
//! deterministic wall-bounce step that the slip kernel is built from.

use std::fmt;

use crate::error::{Error, Result};

/// A grid cell addressed by `(row, col)`, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// All actions in index order. State-action indices depend on this order.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Position of this action inside [`Action::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    /// `(d_row, d_col)` displacement of a successful move.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// Perpendicular slip taken counter-clockwise of the intended heading.
    pub const fn left_of(self) -> Action {
        match self {
            Action::Up => Action::Left,
            Action::Down => Action::Right,
            Action::Left => Action::Down,
            Action::Right => Action::Up,
        }
    }

    /// Perpendicular slip taken clockwise of the intended heading.
    pub const fn right_of(self) -> Action {
        match self {
            Action::Up => Action::Right,
            Action::Down => Action::Left,
            Action::Left => Action::Up,
            Action::Right => Action::Down,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Action::Up => 'U',
            Action::Down => 'D',
            Action::Left => 'L',
            Action::Right => 'R',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Dimensions of an `n_rows x n_cols` grid. Both dimensions are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridBounds {
    n_rows: usize,
    n_cols: usize,
}

impl GridBounds {
    pub fn new(n_rows: usize, n_cols: usize) -> Result<Self> {
        if n_rows == 0 || n_cols == 0 {
            return Err(Error::InvalidBounds { n_rows, n_cols });
        }
        Ok(Self { n_rows, n_cols })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.n_rows * self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.n_rows && cell.col < self.n_cols
    }

    /// Row-major position of `cell`, or `None` when it is off the grid.
    pub fn linear_index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell).then(|| cell.row * self.n_cols + cell.col)
    }

    /// Inverse of [`GridBounds::linear_index`].
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        (index < self.len()).then(|| Cell::new(index / self.n_cols, index % self.n_cols))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.n_rows).flat_map(move |row| (0..self.n_cols).map(move |col| Cell::new(row, col)))
    }

    /// Checks that `cell` is on the grid, naming it by `role` in the error.
    pub fn check(&self, cell: Cell, role: &'static str) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(Error::CellOutOfGrid {
                role,
                row: cell.row,
                col: cell.col,
                n_rows: self.n_rows,
                n_cols: self.n_cols,
            })
        }
    }
}

/// Moves one cell in the direction of `action`. A move that would leave the
/// grid keeps the agent where it is.
pub fn step_deterministic(cell: Cell, action: Action, bounds: &GridBounds) -> Cell {
    let (d_row, d_col) = action.delta();
    let row = cell.row.checked_add_signed(d_row);
    let col = cell.col.checked_add_signed(d_col);
    match (row, col) {
        (Some(row), Some(col)) if bounds.contains(Cell::new(row, col)) => Cell::new(row, col),
        _ => cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_bounds() {
        assert_eq!(
            GridBounds::new(0, 3),
            Err(Error::InvalidBounds { n_rows: 0, n_cols: 3 })
        );
        assert!(GridBounds::new(2, 0).is_err());
    }

    #[test]
    fn test_cells_are_row_major() {
        let bounds = GridBounds::new(2, 3).unwrap();
        let cells: Vec<Cell> = bounds.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[2], Cell::new(0, 2));
        assert_eq!(cells[3], Cell::new(1, 0));
        for (k, cell) in cells.iter().enumerate() {
            assert_eq!(bounds.linear_index(*cell), Some(k));
            assert_eq!(bounds.cell_at(k), Some(*cell));
        }
        assert_eq!(bounds.cell_at(6), None);
    }

    #[test]
    fn test_perpendicular_actions() {
        for action in Action::ALL {
            let (dr, dc) = action.delta();
            for slip in [action.left_of(), action.right_of()] {
                let (sr, sc) = slip.delta();
                assert_eq!(dr * sr + dc * sc, 0, "{action} and {slip} are not perpendicular");
            }
            assert_ne!(action.left_of(), action.right_of());
        }
    }

    #[test]
    fn test_step_bounces_off_walls() {
        let bounds = GridBounds::new(2, 2).unwrap();
        let origin = Cell::new(0, 0);
        assert_eq!(step_deterministic(origin, Action::Up, &bounds), origin);
        assert_eq!(step_deterministic(origin, Action::Left, &bounds), origin);
        assert_eq!(step_deterministic(origin, Action::Right, &bounds), Cell::new(0, 1));
        assert_eq!(step_deterministic(origin, Action::Down, &bounds), Cell::new(1, 0));

        let corner = Cell::new(1, 1);
        assert_eq!(step_deterministic(corner, Action::Down, &bounds), corner);
        assert_eq!(step_deterministic(corner, Action::Right, &bounds), corner);
    }

    #[test]
    fn test_check_names_the_role() {
        let bounds = GridBounds::new(3, 3).unwrap();
        assert!(bounds.check(Cell::new(2, 2), "goal").is_ok());
        let err = bounds.check(Cell::new(3, 0), "start").unwrap_err();
        assert!(err.to_string().contains("start"));
    }
}
