//! Projected primal-dual iteration over occupancy measures.
//!
//! Primal step: projected gradient on `x` over
//! `X = {x >= 0, A x = b, x[goal actions] = 0}` with
//!
//! ```text
//! grad_x L = c + rho * x + lambda_E * e + lambda_T * t
//! x <- argmin_{z in X} |z - (x - alpha * grad_x L)|^2
//! ```
//!
//! Dual step, one per budget, evaluated at the previous iterate:
//!
//! ```text
//! lambda <- max(0, lambda + eta * (cost . x_prev - (budget + beta * lambda)))
//! ```
//!
//! The `beta * lambda` term relaxes each budget as its multiplier grows, so
//! the loop settles where usage meets the relaxed budget rather than the
//! hard one.

use log::{info, warn};
use ndarray::{Array1, ArrayView1};

use super::baseline::{solve_baseline, Baseline};
use super::config::PrimalDualConfig;
use super::history::{ConstraintTrace, IterationRecord};
use crate::env::{Action, Cell};
use crate::error::{Error, Result};
use crate::model::{extract_policy, CostVectors, FlowSystem, GridProblem, Policy, StateActionIndex};
use crate::qp::{InteriorPointSolver, QpSolver, QuadraticProgram};

/// How the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// All stopping thresholds were met at this iteration.
    Converged { iteration: usize },
    /// The iteration cap was reached first.
    Exhausted { iterations: usize },
}

impl Termination {
    pub fn is_converged(&self) -> bool {
        matches!(self, Termination::Converged { .. })
    }
}

/// Everything a solve produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimalDualOutcome {
    /// Final occupancy vector, aligned with `pairs`.
    pub occupancy: Vec<f64>,
    pub pairs: Vec<(Cell, Action)>,
    pub history: Vec<IterationRecord>,
    /// Hard-budget reference point; `None` when it was infeasible or unsolved.
    pub baseline: Option<Baseline>,
    pub policy: Policy,
    pub termination: Termination,
    pub lambda_energy: f64,
    pub lambda_time: f64,
    /// Expected costs per pair, aligned with `pairs`.
    pub price_costs: Vec<f64>,
    pub energy_costs: Vec<f64>,
    pub time_costs: Vec<f64>,
}

impl PrimalDualOutcome {
    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.history.last()
    }
}

/// Runs the loop with the default [`InteriorPointSolver`].
pub fn solve(problem: &GridProblem, config: &PrimalDualConfig) -> Result<PrimalDualOutcome> {
    solve_with(problem, config, &InteriorPointSolver::default())
}

/// One budget constraint with its multiplier.
struct Budget<'a> {
    cost: &'a Array1<f64>,
    budget: f64,
    beta: f64,
    eta: f64,
    lambda: f64,
}

impl Budget<'_> {
    /// Dual step from the previous iterate. Returns the trace fields that
    /// depend on `x_prev`.
    fn dual_step(&mut self, x_prev: ArrayView1<'_, f64>) -> (f64, f64, f64) {
        let usage_prev = self.cost.dot(&x_prev);
        let effective_prev = self.budget + self.beta * self.lambda;
        let residual_prev = usage_prev - effective_prev;
        self.lambda = (self.lambda + self.eta * residual_prev).max(0.0);
        (usage_prev, effective_prev, residual_prev)
    }

    /// Diagnostics at the new iterate with the new multiplier.
    fn trace(&self, x: ArrayView1<'_, f64>, prev: (f64, f64, f64)) -> ConstraintTrace {
        let usage = self.cost.dot(&x);
        let effective_budget = self.budget + self.beta * self.lambda;
        let residual = usage - effective_budget;
        ConstraintTrace {
            usage,
            multiplier: self.lambda,
            effective_budget,
            usage_prev: prev.0,
            effective_budget_prev: prev.1,
            residual_prev: prev.2,
            residual,
            violation: residual.max(0.0),
            complementarity: (self.lambda * residual).abs(),
        }
    }
}

/// Runs the projected primal-dual loop, using `qp` for every projection and
/// for the baseline.
///
/// # Errors
///
/// Configuration errors are returned before any solving. A projection that
/// does not come back optimal ends the solve with [`Error::Projection`],
/// carrying the iteration number (0 for the initial projection).
pub fn solve_with<Q>(
    problem: &GridProblem,
    config: &PrimalDualConfig,
    qp: &Q,
) -> Result<PrimalDualOutcome>
where
    Q: QpSolver + ?Sized,
{
    config.validate()?;

    let index = StateActionIndex::new(*problem.bounds());
    let costs = CostVectors::build(problem, &index);
    let flow = FlowSystem::build(problem, &index);
    let pinned: Vec<usize> = index
        .action_indices(problem.goal())
        .map(|k| k.to_vec())
        .unwrap_or_default();
    let n = index.len();

    let project = |point: ArrayView1<'_, f64>, iteration: usize| -> Result<Array1<f64>> {
        let program = QuadraticProgram::projection(point, flow.a.view(), flow.b.view(), &pinned);
        qp.solve(&program)
            .map(|solution| solution.x)
            .map_err(|source| Error::Projection { iteration, source })
    };

    let mut x = project(Array1::zeros(n).view(), 0)?;

    let baseline = match solve_baseline(&flow, &costs, &pinned, config.budgets, config.rho, qp) {
        Ok(baseline) => {
            info!(
                "baseline objective {:.6}, energy {:.6}, time {:.6}",
                baseline.objective, baseline.energy, baseline.time
            );
            Some(baseline)
        }
        Err(err) => {
            warn!("baseline infeasible or not solved: {err}");
            None
        }
    };

    let mut energy = Budget {
        cost: &costs.energy,
        budget: config.budgets.energy,
        beta: config.beta_energy,
        eta: config.eta_energy,
        lambda: config.lambda_energy0,
    };
    let mut time = Budget {
        cost: &costs.time,
        budget: config.budgets.time,
        beta: config.beta_time,
        eta: config.eta_time,
        lambda: config.lambda_time0,
    };

    let tol = config.tolerances;
    // The cap may be far above the iterations convergence actually takes.
    let mut history = Vec::with_capacity(config.max_iterations.min(1024));
    let mut termination = Termination::Exhausted {
        iterations: config.max_iterations,
    };

    for iteration in 1..=config.max_iterations {
        let x_prev = x;

        let gradient = &costs.price
            + &(config.rho * &x_prev)
            + &(energy.lambda * &costs.energy)
            + &(time.lambda * &costs.time);
        let y = &x_prev - &(config.alpha * &gradient);
        x = project(y.view(), iteration)?;

        let energy_prev = energy.dual_step(x_prev.view());
        let time_prev = time.dual_step(x_prev.view());

        let price_raw = costs.price.dot(&x);
        let reg_term = 0.5 * config.rho * x.dot(&x);
        let dx1 = (&x - &x_prev).mapv(f64::abs).sum();

        let record = IterationRecord {
            iteration,
            price_raw,
            price_reg: price_raw + reg_term,
            reg_term,
            energy: energy.trace(x.view(), energy_prev),
            time: time.trace(x.view(), time_prev),
            dx1,
        };
        history.push(record);

        if dx1 < tol.step
            && record.max_violation() < tol.violation
            && record.max_complementarity() < tol.complementarity
        {
            info!(
                "converged at t={iteration}: violE={:.2e}, violT={:.2e}, csE={:.2e}, csT={:.2e}, \
                 dx={dx1:.2e}, lamE={:.4}, lamT={:.4}",
                record.energy.violation,
                record.time.violation,
                record.energy.complementarity,
                record.time.complementarity,
                energy.lambda,
                time.lambda,
            );
            termination = Termination::Converged { iteration };
            break;
        }

        if config.log_every > 0 && (iteration == 1 || iteration % config.log_every == 0) {
            info!(
                "t={iteration:03} lamE={:8.4} lamT={:8.4} E_prev={:8.4} Eeff_prev={:8.4} \
                 rE_prev={:+9.4} T_prev={:8.4} Teff_prev={:8.4} rT_prev={:+9.4} price_reg={:8.4}",
                energy.lambda,
                time.lambda,
                record.energy.usage_prev,
                record.energy.effective_budget_prev,
                record.energy.residual_prev,
                record.time.usage_prev,
                record.time.effective_budget_prev,
                record.time.residual_prev,
                record.price_reg,
            );
        }
    }

    let occupancy = x.to_vec();
    let policy = extract_policy(&occupancy, &index, problem.goal());

    Ok(PrimalDualOutcome {
        occupancy,
        pairs: index.pairs().to_vec(),
        history,
        baseline,
        policy,
        termination,
        lambda_energy: energy.lambda,
        lambda_time: time.lambda,
        price_costs: costs.price.to_vec(),
        energy_costs: costs.energy.to_vec(),
        time_costs: costs.time.to_vec(),
    })
}
