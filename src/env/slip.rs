//! Slip transition kernel.
//!
//! The intended move succeeds with probability `1 - p`; each of the two
//! perpendicular moves happens with probability `p / 2`. Moves into a wall
//! leave the agent in place. The goal is absorbing.

use super::gridworld::{step_deterministic, Action, Cell, GridBounds};

/// Distribution over destination cells for one state-action pair.
///
/// Destinations are kept in the order they first receive mass (intended move,
/// then left slip, then right slip), so sums over a distribution are
/// reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDistribution {
    outcomes: Vec<(Cell, f64)>,
}

impl TransitionDistribution {
    /// All mass on `cell`.
    pub fn point(cell: Cell) -> Self {
        Self {
            outcomes: vec![(cell, 1.0)],
        }
    }

    fn accumulate(&mut self, cell: Cell, probability: f64) {
        match self.outcomes.iter_mut().find(|(dest, _)| *dest == cell) {
            Some((_, mass)) => *mass += probability,
            None => self.outcomes.push((cell, probability)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.outcomes.iter().copied()
    }

    /// Probability of landing on `cell`; zero for unreachable cells.
    pub fn probability(&self, cell: Cell) -> f64 {
        self.outcomes
            .iter()
            .find(|(dest, _)| *dest == cell)
            .map_or(0.0, |(_, p)| *p)
    }

    pub fn total(&self) -> f64 {
        self.outcomes.iter().map(|(_, p)| p).sum()
    }

    /// Number of distinct destinations.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Transition distribution of taking `action` in `cell` with slip
/// probability `slip`.
///
/// When `goal` is given and `cell` is the goal, the result is `{goal: 1.0}`
/// whatever the action. `slip` is expected in `[0, 1]`; problem construction
/// rejects anything else.
pub fn slip_transitions(
    cell: Cell,
    action: Action,
    slip: f64,
    bounds: &GridBounds,
    goal: Option<Cell>,
) -> TransitionDistribution {
    if goal == Some(cell) {
        return TransitionDistribution::point(cell);
    }
    debug_assert!((0.0..=1.0).contains(&slip), "slip {slip} outside [0, 1]");

    let mut dist = TransitionDistribution {
        outcomes: Vec::with_capacity(3),
    };
    let branches = [
        (action, 1.0 - slip),
        (action.left_of(), slip / 2.0),
        (action.right_of(), slip / 2.0),
    ];
    for (taken, probability) in branches {
        if probability <= 0.0 {
            continue;
        }
        dist.accumulate(step_deterministic(cell, taken, bounds), probability);
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_probabilities_sum_to_one() {
        let bounds = GridBounds::new(3, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut slips: Vec<f64> = (0..20).map(|_| rng.gen_range(0.0..=1.0)).collect();
        slips.extend([0.0, 0.5, 1.0]);

        for slip in slips {
            for cell in bounds.cells() {
                for action in Action::ALL {
                    let dist = slip_transitions(cell, action, slip, &bounds, None);
                    assert_abs_diff_eq!(dist.total(), 1.0, epsilon = 1e-12);
                    assert!(dist.iter().all(|(dest, p)| bounds.contains(dest) && p >= 0.0));
                }
            }
        }
    }

    #[test]
    fn test_goal_is_absorbing() {
        let bounds = GridBounds::new(3, 3).unwrap();
        let goal = Cell::new(1, 1);
        for slip in [0.0, 0.3, 1.0] {
            for action in Action::ALL {
                let dist = slip_transitions(goal, action, slip, &bounds, Some(goal));
                assert_eq!(dist, TransitionDistribution::point(goal));
            }
        }
    }

    #[test]
    fn test_zero_slip_is_deterministic() {
        let bounds = GridBounds::new(3, 3).unwrap();
        let dist = slip_transitions(Cell::new(1, 1), Action::Right, 0.0, &bounds, None);
        assert_eq!(dist.len(), 1);
        assert_abs_diff_eq!(dist.probability(Cell::new(1, 2)), 1.0);
        assert_abs_diff_eq!(dist.probability(Cell::new(0, 1)), 0.0);
        assert_abs_diff_eq!(dist.probability(Cell::new(2, 1)), 0.0);
    }

    #[test]
    fn test_slip_splits_to_perpendicular_cells() {
        let bounds = GridBounds::new(3, 3).unwrap();
        let dist = slip_transitions(Cell::new(1, 1), Action::Up, 0.2, &bounds, None);
        assert_eq!(dist.len(), 3);
        assert_abs_diff_eq!(dist.probability(Cell::new(0, 1)), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(dist.probability(Cell::new(1, 0)), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(dist.probability(Cell::new(1, 2)), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_wall_bounces_accumulate() {
        // Up from the top-left corner: the intended move and the left slip
        // both hit a wall and land back on the origin.
        let bounds = GridBounds::new(2, 2).unwrap();
        let origin = Cell::new(0, 0);
        let dist = slip_transitions(origin, Action::Up, 0.4, &bounds, None);
        assert_eq!(dist.len(), 2);
        assert_abs_diff_eq!(dist.probability(origin), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(dist.probability(Cell::new(0, 1)), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_goal_reachable_from_neighbour() {
        let bounds = GridBounds::new(2, 2).unwrap();
        let goal = Cell::new(1, 1);
        let dist = slip_transitions(Cell::new(0, 1), Action::Down, 0.2, &bounds, Some(goal));
        assert_abs_diff_eq!(dist.probability(goal), 0.8, epsilon = 1e-12);
    }
}
