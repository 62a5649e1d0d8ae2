//! Convex quadratic programs over non-negative variables.
//!
//! The planner needs a single capability from a QP solver: minimize
//!
//! ```text
//! 1/2 x^T diag(h) x + q^T x
//! subject to  A_eq x = b_eq
//!             G x <= g
//!             x >= 0,  x[pinned] = 0
//! ```
//!
//! Both the Euclidean projection onto the occupancy polytope and the
//! hard-budget baseline have this shape. [`QpSolver`] is that capability;
//! [`interior_point::InteriorPointSolver`] is the implementation shipped with
//! the crate.

pub mod interior_point;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use thiserror::Error;

pub use interior_point::{InteriorPointConfig, InteriorPointSolver};

/// Reasons a QP solve produced no usable point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QpError {
    #[error("problem is infeasible (scaled primal residual {residual:.3e})")]
    Infeasible { residual: f64 },

    #[error("problem is unbounded below")]
    Unbounded,

    #[error("iteration limit of {0} reached before convergence")]
    IterationLimit(usize),

    #[error("numerical breakdown: {0}")]
    Numerical(&'static str),

    #[error("dimension mismatch: {0}")]
    Dimension(String),
}

/// Quality of an accepted solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QpStatus {
    /// All residuals within the solver's tight tolerance.
    Optimal,
    /// Residuals only within the looser acceptable tolerance.
    NearOptimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    pub x: Array1<f64>,
    pub objective: f64,
    pub status: QpStatus,
    pub iterations: usize,
}

/// A convex QP with diagonal Hessian. The equality block is borrowed so the
/// flow matrix is never copied per projection.
#[derive(Debug, Clone)]
pub struct QuadraticProgram<'a> {
    pub hessian_diag: Array1<f64>,
    pub linear: Array1<f64>,
    pub eq_matrix: ArrayView2<'a, f64>,
    pub eq_rhs: ArrayView1<'a, f64>,
    pub ineq_matrix: Array2<f64>,
    pub ineq_rhs: Array1<f64>,
    pub pinned: &'a [usize],
}

impl<'a> QuadraticProgram<'a> {
    /// Euclidean projection of `point` onto
    /// `{x >= 0, A x = b, x[pinned] = 0}`, written as
    /// `min 1/2 |x|^2 - point^T x`.
    pub fn projection(
        point: ArrayView1<'_, f64>,
        eq_matrix: ArrayView2<'a, f64>,
        eq_rhs: ArrayView1<'a, f64>,
        pinned: &'a [usize],
    ) -> Self {
        let n = point.len();
        Self {
            hessian_diag: Array1::ones(n),
            linear: point.mapv(|v| -v),
            eq_matrix,
            eq_rhs,
            ineq_matrix: Array2::zeros((0, n)),
            ineq_rhs: Array1::zeros(0),
            pinned,
        }
    }

    pub fn n_vars(&self) -> usize {
        self.linear.len()
    }

    /// Adds the row `coefficients . x <= bound`.
    pub fn with_inequality(mut self, coefficients: ArrayView1<'_, f64>, bound: f64) -> Self {
        let n = self.n_vars();
        let k = self.ineq_matrix.nrows();
        let mut matrix = Array2::zeros((k + 1, n));
        matrix.slice_mut(ndarray::s![..k, ..]).assign(&self.ineq_matrix);
        matrix.row_mut(k).assign(&coefficients);
        self.ineq_matrix = matrix;
        self.ineq_rhs = self
            .ineq_rhs
            .iter()
            .copied()
            .chain(std::iter::once(bound))
            .collect();
        self
    }

    /// `1/2 x^T diag(h) x + q^T x`.
    pub fn objective(&self, x: ArrayView1<'_, f64>) -> f64 {
        let quadratic: f64 = self
            .hessian_diag
            .iter()
            .zip(x.iter())
            .map(|(h, v)| h * v * v)
            .sum();
        0.5 * quadratic + self.linear.dot(&x)
    }

    pub fn validate(&self) -> Result<(), QpError> {
        let n = self.n_vars();
        if self.hessian_diag.len() != n {
            return Err(QpError::Dimension(format!(
                "hessian has {} entries for {n} variables",
                self.hessian_diag.len()
            )));
        }
        if self.hessian_diag.iter().any(|h| !h.is_finite() || *h < 0.0) {
            return Err(QpError::Dimension(
                "hessian diagonal must be finite and non-negative".to_string(),
            ));
        }
        if self.eq_matrix.ncols() != n || self.eq_matrix.nrows() != self.eq_rhs.len() {
            return Err(QpError::Dimension(format!(
                "equality block is {:?} with {} right-hand sides for {n} variables",
                self.eq_matrix.dim(),
                self.eq_rhs.len()
            )));
        }
        if self.ineq_matrix.ncols() != n || self.ineq_matrix.nrows() != self.ineq_rhs.len() {
            return Err(QpError::Dimension(format!(
                "inequality block is {:?} with {} right-hand sides for {n} variables",
                self.ineq_matrix.dim(),
                self.ineq_rhs.len()
            )));
        }
        if let Some(&k) = self.pinned.iter().find(|&&k| k >= n) {
            return Err(QpError::Dimension(format!(
                "pinned index {k} out of range for {n} variables"
            )));
        }
        Ok(())
    }
}

/// The QP capability used by the planner.
///
/// Any non-optimal outcome must come back as an `Err`; callers never inspect
/// a failed point.
pub trait QpSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &QuadraticProgram<'_>) -> Result<QpSolution, QpError>;
}
