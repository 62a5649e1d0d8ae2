//! Reference solve with the budgets as hard constraints.

use ndarray::{Array1, Array2};

use super::config::Budgets;
use crate::model::{CostVectors, FlowSystem};
use crate::qp::{QpError, QpSolver, QuadraticProgram};

/// Optimum of `min c.x + rho/2 |x|^2` over occupancy measures with
/// `e.x <= Emax` and `t.x <= Tmax`.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub occupancy: Vec<f64>,
    pub price: f64,
    pub energy: f64,
    pub time: f64,
    /// `c.x + rho/2 |x|^2`
    pub objective: f64,
}

/// Solves the hard-budget problem once. Infeasible budgets are an expected
/// outcome and come back as the solver's error.
pub fn solve_baseline<Q>(
    flow: &FlowSystem,
    costs: &CostVectors,
    pinned: &[usize],
    budgets: Budgets,
    rho: f64,
    qp: &Q,
) -> Result<Baseline, QpError>
where
    Q: QpSolver + ?Sized,
{
    let n = costs.price.len();
    let program = QuadraticProgram {
        hessian_diag: Array1::from_elem(n, rho),
        linear: costs.price.clone(),
        eq_matrix: flow.a.view(),
        eq_rhs: flow.b.view(),
        ineq_matrix: Array2::zeros((0, n)),
        ineq_rhs: Array1::zeros(0),
        pinned,
    }
    .with_inequality(costs.energy.view(), budgets.energy)
    .with_inequality(costs.time.view(), budgets.time);

    let solution = qp.solve(&program)?;
    let x = solution.x;
    Ok(Baseline {
        price: costs.price.dot(&x),
        energy: costs.energy.dot(&x),
        time: costs.time.dot(&x),
        objective: costs.price.dot(&x) + 0.5 * rho * x.dot(&x),
        occupancy: x.to_vec(),
    })
}
