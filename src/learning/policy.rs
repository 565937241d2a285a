//! Action selection shared by the learning strategies

use rand::{Rng, seq::IndexedRandom};

use crate::{
    app::{LearningConfig, RewardConfig},
    types::Direction,
};

/// Outcome of one action selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice {
    pub direction: Direction,
    /// The ε branch replaced the greedy choice
    pub explored: bool,
    /// Scores after the reverse penalty, indexed like [`Direction::ALL`]
    pub scores: [f64; 4],
}

/// Add `penalty` to the score of the move that would undo `last`.
pub fn shape_scores(raw: [f64; 4], last: Option<Direction>, penalty: f64) -> [f64; 4] {
    let mut scores = raw;
    if let Some(last) = last {
        scores[last.opposite().index()] += penalty;
    }
    scores
}

/// Directions whose score equals the maximum. Falls back to all four
/// when no score is comparable.
pub fn best_directions(scores: &[f64; 4]) -> Vec<Direction> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let best: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|direction| scores[direction.index()] == max)
        .collect();
    if best.is_empty() {
        Direction::ALL.to_vec()
    } else {
        best
    }
}

pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.random_range(0..Direction::ALL.len())]
}

/// Uniform pick among `candidates`, or among all directions if empty.
pub fn pick<R: Rng + ?Sized>(candidates: &[Direction], rng: &mut R) -> Direction {
    match candidates.choose(rng) {
        Some(&direction) => direction,
        None => random_direction(rng),
    }
}

/// ε-greedy choice over reverse-penalized scores, ties broken uniformly.
pub fn choose<R: Rng + ?Sized>(
    raw: [f64; 4],
    last: Option<Direction>,
    config: &LearningConfig,
    rng: &mut R,
) -> Choice {
    let scores = shape_scores(raw, last, config.reverse_penalty);

    if rng.random::<f64>() < config.exploration_rate {
        return Choice {
            direction: random_direction(rng),
            explored: true,
            scores,
        };
    }

    Choice {
        direction: pick(&best_directions(&scores), rng),
        explored: false,
        scores,
    }
}

/// ε-greedy choice among units that fire (activation `1`).
///
/// The move that would undo `last` is dropped only while another unit also
/// fires. When no unit fires, all four directions are candidates.
pub fn choose_firing<R: Rng + ?Sized>(
    activations: [f64; 4],
    last: Option<Direction>,
    config: &LearningConfig,
    rng: &mut R,
) -> Choice {
    if rng.random::<f64>() < config.exploration_rate {
        return Choice {
            direction: random_direction(rng),
            explored: true,
            scores: activations,
        };
    }

    let mut firing: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|direction| activations[direction.index()] >= 1.0)
        .collect();
    if let Some(reverse) = last.map(Direction::opposite) {
        if firing.len() > 1 {
            firing.retain(|&direction| direction != reverse);
        }
    }

    Choice {
        direction: pick(&firing, rng),
        explored: false,
        scores: activations,
    }
}

/// Reward for a step that moved from odor `before` to odor `after`.
pub fn step_reward(config: &RewardConfig, found_food: bool, before: u32, after: u32) -> f64 {
    let mut reward = config.step_penalty;
    if found_food {
        reward += config.food_bonus;
    }
    if config.odor_gradient_weight != 0.0 {
        let delta = (i64::from(after) - i64::from(before)).clamp(-1, 1) as f64;
        reward += config.odor_gradient_weight * delta;
    }
    reward
}
