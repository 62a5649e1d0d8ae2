//! Recovering a stochastic policy from an occupancy vector.

use std::collections::BTreeMap;

use log::debug;

use super::indexing::StateActionIndex;
use crate::env::{Action, Cell};

/// States whose total occupancy is at or below this get an all-zero
/// distribution.
pub const DEGENERATE_MASS_TOLERANCE: f64 = 1e-10;

/// Action probabilities at one state, in [`Action::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionDistribution(pub [f64; 4]);

impl ActionDistribution {
    pub fn get(&self, action: Action) -> f64 {
        self.0[action.index()]
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// True for the all-zero distribution of an unreached state.
    pub fn is_degenerate(&self) -> bool {
        self.0.iter().all(|p| *p == 0.0)
    }

    /// Most probable action; ties go to the earlier action. `None` when
    /// degenerate.
    pub fn most_likely(&self) -> Option<Action> {
        if self.is_degenerate() {
            return None;
        }
        Action::ALL
            .into_iter()
            .fold(None, |best: Option<Action>, action| match best {
                Some(b) if self.get(b) >= self.get(action) => Some(b),
                _ => Some(action),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

/// Distribution over actions for every non-goal state.
pub type Policy = BTreeMap<Cell, ActionDistribution>;

/// Normalizes the occupancy mass of each non-goal state over its four
/// actions.
///
/// A state with total mass at or below [`DEGENERATE_MASS_TOLERANCE`] maps to
/// the all-zero distribution. The goal is left out of the result.
pub fn extract_policy(occupancy: &[f64], index: &StateActionIndex, goal: Cell) -> Policy {
    let mut policy = Policy::new();
    for &cell in index.states() {
        if cell == goal {
            continue;
        }
        let Some(columns) = index.action_indices(cell) else {
            continue;
        };
        let masses = columns.map(|k| occupancy.get(k).copied().unwrap_or(0.0));
        let total: f64 = masses.iter().sum();

        let dist = if total <= DEGENERATE_MASS_TOLERANCE {
            debug!("state {cell} carries mass {total:.3e}; leaving its policy empty");
            ActionDistribution::default()
        } else {
            ActionDistribution(masses.map(|m| m / total))
        };
        policy.insert(cell, dist);
    }
    policy
}
