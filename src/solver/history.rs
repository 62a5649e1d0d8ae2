//! Per-iteration diagnostics of the primal-dual loop.

/// State of one budget constraint after an iteration.
///
/// The `*_prev` fields are the quantities the dual step actually used,
/// taken at the previous iterate with the previous multiplier. The rest
/// describe the new iterate with the new multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstraintTrace {
    /// `cost . x`
    pub usage: f64,
    /// Multiplier after the dual step
    pub multiplier: f64,
    /// `budget + beta * multiplier`
    pub effective_budget: f64,
    /// `cost . x_prev`
    pub usage_prev: f64,
    /// `budget + beta * multiplier_prev`
    pub effective_budget_prev: f64,
    /// `usage_prev - effective_budget_prev`
    pub residual_prev: f64,
    /// `usage - effective_budget`
    pub residual: f64,
    /// `max(0, residual)`
    pub violation: f64,
    /// `|multiplier * residual|`
    pub complementarity: f64,
}

impl ConstraintTrace {
    /// Slack granted by the relaxation, `effective_budget - budget`.
    pub fn slack(&self, budget: f64) -> f64 {
        self.effective_budget - budget
    }
}

/// One entry of the iteration history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    /// `c . x`
    pub price_raw: f64,
    /// `c . x + rho / 2 * |x|^2`
    pub price_reg: f64,
    /// `rho / 2 * |x|^2`
    pub reg_term: f64,
    pub energy: ConstraintTrace,
    pub time: ConstraintTrace,
    /// `|x - x_prev|_1`
    pub dx1: f64,
}

impl IterationRecord {
    pub fn max_violation(&self) -> f64 {
        self.energy.violation.max(self.time.violation)
    }

    pub fn max_complementarity(&self) -> f64 {
        self.energy.complementarity.max(self.time.complementarity)
    }
}
