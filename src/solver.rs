pub mod baseline;
pub mod config;
pub mod history;
pub mod primal_dual;
pub mod summary;
pub mod sweep;


pub use baseline::{solve_baseline, Baseline};
pub use config::{Budgets, ConvergenceTolerances, PrimalDualConfig};
pub use history::{ConstraintTrace, IterationRecord};
pub use primal_dual::{solve, solve_with, PrimalDualOutcome, Termination};
pub use summary::{BaselineSummary, ConstraintSummary, RunSummary};
pub use sweep::solve_sweep;
