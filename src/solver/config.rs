use crate::error::{Error, Result};

/// Energy and time budgets. Both are soft in the primal-dual loop and hard
/// in the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budgets {
    pub energy: f64,
    pub time: f64,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            energy: 3.0,
            time: 3.0,
        }
    }
}

/// Stopping thresholds of the primal-dual loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceTolerances {
    /// Bound on `|x - x_prev|_1`
    pub step: f64,
    /// Bound on each one-sided budget violation
    pub violation: f64,
    /// Bound on each `|lambda * residual|`
    pub complementarity: f64,
}

impl Default for ConvergenceTolerances {
    fn default() -> Self {
        Self {
            step: 1e-6,
            violation: 1e-4,
            complementarity: 1e-6,
        }
    }
}

/// Configuration options for the projected primal-dual loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimalDualConfig {
    pub budgets: Budgets,
    /// Relaxation of the energy budget per unit of `lambda_energy`
    pub beta_energy: f64,
    /// Relaxation of the time budget per unit of `lambda_time`
    pub beta_time: f64,
    /// Weight of the `rho / 2 * |x|^2` regularizer
    pub rho: f64,
    /// Primal step size
    pub alpha: f64,
    /// Dual step size for the energy multiplier
    pub eta_energy: f64,
    /// Dual step size for the time multiplier
    pub eta_time: f64,
    /// Maximum number of primal-dual iterations
    pub max_iterations: usize,
    pub lambda_energy0: f64,
    pub lambda_time0: f64,
    /// Progress is logged every `log_every` iterations; 0 disables it
    pub log_every: usize,
    pub tolerances: ConvergenceTolerances,
}

impl Default for PrimalDualConfig {
    fn default() -> Self {
        Self {
            budgets: Budgets::default(),
            beta_energy: 5.0,
            beta_time: 5.0,
            rho: 1e-2,
            alpha: 0.02,
            eta_energy: 0.02,
            eta_time: 0.02,
            max_iterations: 200,
            lambda_energy0: 0.0,
            lambda_time0: 0.0,
            log_every: 10,
            tolerances: ConvergenceTolerances::default(),
        }
    }
}

impl PrimalDualConfig {
    pub fn with_budgets(mut self, energy: f64, time: f64) -> Self {
        self.budgets = Budgets { energy, time };
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Rejects parameters the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        finite("energy budget", self.budgets.energy)?;
        finite("time budget", self.budgets.time)?;
        non_negative("beta_energy", self.beta_energy)?;
        non_negative("beta_time", self.beta_time)?;
        non_negative("rho", self.rho)?;
        non_negative("eta_energy", self.eta_energy)?;
        non_negative("eta_time", self.eta_time)?;
        non_negative("lambda_energy0", self.lambda_energy0)?;
        non_negative("lambda_time0", self.lambda_time0)?;
        non_negative("step tolerance", self.tolerances.step)?;
        non_negative("violation tolerance", self.tolerances.violation)?;
        non_negative("complementarity tolerance", self.tolerances.complementarity)?;
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(Error::InvalidParameter {
                name: "alpha",
                value: self.alpha,
                reason: "step size must be positive and finite",
            });
        }
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PrimalDualConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_alpha() {
        let config = PrimalDualConfig {
            alpha: 0.0,
            ..PrimalDualConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_relaxation() {
        let config = PrimalDualConfig {
            beta_time: -1.0,
            ..PrimalDualConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter {
                name: "beta_time",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_infinite_budget() {
        let config = PrimalDualConfig::default().with_budgets(f64::INFINITY, 1.0);
        assert!(config.validate().is_err());
    }
}
