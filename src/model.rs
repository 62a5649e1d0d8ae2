pub mod costs;
pub mod flow;
pub mod indexing;
pub mod policy;
pub mod problem;

pub use costs::{CostGrids, CostVectors};
pub use flow::FlowSystem;
pub use indexing::StateActionIndex;
pub use policy::{extract_policy, ActionDistribution, Policy, DEGENERATE_MASS_TOLERANCE};
pub use problem::GridProblem;
