use thiserror::Error;

use crate::qp::QpError;

/// Errors raised while validating a problem or running a solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid grid bounds {n_rows}x{n_cols}: both dimensions must be positive")]
    InvalidBounds { n_rows: usize, n_cols: usize },

    #[error("{role} cell ({row}, {col}) lies outside the {n_rows}x{n_cols} grid")]
    CellOutOfGrid {
        role: &'static str,
        row: usize,
        col: usize,
        n_rows: usize,
        n_cols: usize,
    },

    #[error("slip probability {0} is outside [0, 1]")]
    InvalidSlip(f64),

    #[error("{name} cost grid has shape {actual:?}, expected {expected:?}")]
    CostGridShape {
        name: &'static str,
        actual: (usize, usize),
        expected: (usize, usize),
    },

    #[error("{name} cost grid contains a non-finite value at ({row}, {col})")]
    NonFiniteCost {
        name: &'static str,
        row: usize,
        col: usize,
    },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The projection onto the occupancy polytope did not return an optimal
    /// point. Iteration 0 is the initial projection of the zero vector.
    #[error("projection failed at iteration {iteration}: {source}")]
    Projection {
        iteration: usize,
        #[source]
        source: QpError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
