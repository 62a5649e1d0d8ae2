pub mod gridworld;
pub mod slip;

pub use gridworld::{step_deterministic, Action, Cell, GridBounds};
pub use slip::{slip_transitions, TransitionDistribution};
