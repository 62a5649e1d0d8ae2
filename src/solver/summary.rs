//! End-of-run figures: final totals, relaxation slack and the penalty paid
//! for it.

use std::fmt;

use super::baseline::Baseline;
use super::config::PrimalDualConfig;
use super::primal_dual::PrimalDualOutcome;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineSummary {
    pub price: f64,
    pub energy: f64,
    pub time: f64,
    pub objective: f64,
}

impl From<&Baseline> for BaselineSummary {
    fn from(baseline: &Baseline) -> Self {
        Self {
            price: baseline.price,
            energy: baseline.energy,
            time: baseline.time,
            objective: baseline.objective,
        }
    }
}

/// Final state of one budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintSummary {
    pub budget: f64,
    pub usage: f64,
    pub multiplier: f64,
    /// `budget + beta * multiplier`
    pub effective_budget: f64,
    /// `effective_budget - budget`
    pub slack: f64,
    /// `max(0, usage - effective_budget)`
    pub violation: f64,
    /// `beta / 2 * multiplier^2`
    pub penalty: f64,
}

impl ConstraintSummary {
    fn new(budget: f64, beta: f64, usage: f64, multiplier: f64) -> Self {
        let effective_budget = budget + beta * multiplier;
        Self {
            budget,
            usage,
            multiplier,
            effective_budget,
            slack: effective_budget - budget,
            violation: (usage - effective_budget).max(0.0),
            penalty: 0.5 * beta * multiplier * multiplier,
        }
    }
}

/// Summary of a finished solve, comparable against the hard-budget baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub baseline: Option<BaselineSummary>,
    /// `c . x` at the final occupancy
    pub price: f64,
    pub energy: ConstraintSummary,
    pub time: ConstraintSummary,
    pub penalty_total: f64,
    /// `price + penalty_total`
    pub all_in: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl RunSummary {
    pub fn new(outcome: &PrimalDualOutcome, config: &PrimalDualConfig) -> Self {
        let dot = |costs: &[f64]| -> f64 {
            costs
                .iter()
                .zip(outcome.occupancy.iter())
                .map(|(c, x)| c * x)
                .sum()
        };
        let price = dot(&outcome.price_costs);
        let energy = ConstraintSummary::new(
            config.budgets.energy,
            config.beta_energy,
            dot(&outcome.energy_costs),
            outcome.lambda_energy,
        );
        let time = ConstraintSummary::new(
            config.budgets.time,
            config.beta_time,
            dot(&outcome.time_costs),
            outcome.lambda_time,
        );
        let penalty_total = energy.penalty + time.penalty;

        Self {
            baseline: outcome.baseline.as_ref().map(BaselineSummary::from),
            price,
            energy,
            time,
            penalty_total,
            all_in: price + penalty_total,
            iterations: outcome.history.len(),
            converged: outcome.converged(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SUMMARY ===")?;
        match &self.baseline {
            None => writeln!(f, "BASELINE: infeasible or not solved.")?,
            Some(b) => {
                writeln!(f, "BASELINE:")?;
                writeln!(f, "  price  = {:.6}", b.price)?;
                writeln!(f, "  energy = {:.6}  (<= {})", b.energy, self.energy.budget)?;
                writeln!(f, "  time   = {:.6}  (<= {})", b.time, self.time.budget)?;
            }
        }
        let status = if self.converged { "converged" } else { "not converged" };
        writeln!(f, "PRIMAL-DUAL FINAL ({} iterations, {status}):", self.iterations)?;
        for (name, c) in [("E", &self.energy), ("T", &self.time)] {
            writeln!(
                f,
                "  lam{name}   = {:.6}   => {name}_eff = {:.6} (slack{name}={:.6})",
                c.multiplier, c.effective_budget, c.slack
            )?;
        }
        writeln!(f, "  price  = {:.6}", self.price)?;
        writeln!(f, "  energy = {:.6}  (violE={:.3e})", self.energy.usage, self.energy.violation)?;
        writeln!(f, "  time   = {:.6}  (violT={:.3e})", self.time.usage, self.time.violation)?;
        writeln!(f, "Penalty paid:")?;
        writeln!(f, "  energy slack cost = {:.6}", self.energy.penalty)?;
        writeln!(f, "  time   slack cost = {:.6}", self.time.penalty)?;
        writeln!(f, "  total  penalty    = {:.6}", self.penalty_total)?;
        writeln!(f, "FINAL (raw): {:.6}", self.price)?;
        writeln!(f, "Penalty: {:.6}", self.penalty_total)?;
        write!(f, "FINAL (all-in): {:.6}", self.all_in)
    }
}
