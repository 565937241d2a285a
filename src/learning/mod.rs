//! Decision and learning strategies.
//!
//! [`LearningStrategy`] is a closed set of variants sharing one contract,
//! [`LearningStrategy::choose_and_learn`]: perceive, pick a direction and,
//! for the learning variants, update the owned value store from the
//! observed transition.

pub mod monte_carlo;
pub mod perceptron;
pub mod policy;
pub mod q_learning;
pub mod q_table;

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use monte_carlo::{EpisodeStep, MonteCarloControl};
pub use perceptron::{LinearUnit, PerceptronEnsemble};
pub use policy::Choice;
pub use q_learning::QLearning;
pub use q_table::QTable;

use crate::{
    Result,
    app::{LearningConfig, RewardConfig},
    episode_log::EpisodeLog,
    error::Error,
    types::{Direction, Position, State},
    value_store::ValueStore,
    world::Environment,
};

/// Strategy selector, as named in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    OdorFollowing,
    MonteCarlo,
    QLearning,
    Perceptron,
}

const STRATEGY_NAMES: &str = "random, odor, brain";
const METHOD_NAMES: &str = "Monte-Carlo, Q-Learning, Perceptron";

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Random,
        StrategyKind::OdorFollowing,
        StrategyKind::MonteCarlo,
        StrategyKind::QLearning,
        StrategyKind::Perceptron,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::OdorFollowing => "odor",
            StrategyKind::MonteCarlo => "Monte-Carlo",
            StrategyKind::QLearning => "Q-Learning",
            StrategyKind::Perceptron => "Perceptron",
        }
    }

    /// Whether agents of this kind own a value store.
    pub fn is_learning(&self) -> bool {
        matches!(
            self,
            StrategyKind::MonteCarlo | StrategyKind::QLearning | StrategyKind::Perceptron
        )
    }

    /// Resolve the two-level naming: a movement strategy (`random`, `odor`
    /// or `brain`) and, for `brain`, a learning method.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStrategy`] or [`Error::UnknownLearningMethod`] for
    /// names outside those sets, including a missing method for `brain`.
    pub fn from_names(strategy: &str, method: Option<&str>) -> Result<Self> {
        match normalize(strategy).as_str() {
            "random" => Ok(StrategyKind::Random),
            "odor" => Ok(StrategyKind::OdorFollowing),
            "brain" => {
                let method = method.unwrap_or_default();
                Self::learning_method(method).ok_or_else(|| Error::UnknownLearningMethod {
                    name: method.to_string(),
                    expected: METHOD_NAMES.to_string(),
                })
            }
            _ => Err(Error::UnknownStrategy {
                name: strategy.to_string(),
                expected: STRATEGY_NAMES.to_string(),
            }),
        }
    }

    fn learning_method(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "monte-carlo" | "monte-carlo-methode" | "mc" => Some(StrategyKind::MonteCarlo),
            "q-learning" | "qlearning" | "q" => Some(StrategyKind::QLearning),
            "perceptron" => Some(StrategyKind::Perceptron),
            _ => None,
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    /// Accepts a movement strategy or a learning method name directly.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "random" => Ok(StrategyKind::Random),
            "odor" | "odor-following" => Ok(StrategyKind::OdorFollowing),
            other => Self::learning_method(other).ok_or_else(|| Error::UnknownStrategy {
                name: s.to_string(),
                expected: format!("random, odor, {METHOD_NAMES}"),
            }),
        }
    }
}

/// Read-only inputs of one decision.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub env: &'a Environment,
    pub learning: &'a LearningConfig,
    pub rewards: &'a RewardConfig,
}

impl<'a> StepContext<'a> {
    pub fn new(
        env: &'a Environment,
        learning: &'a LearningConfig,
        rewards: &'a RewardConfig,
    ) -> Self {
        Self {
            env,
            learning,
            rewards,
        }
    }
}

/// Change a learning step made to its value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueUpdate {
    /// One Q-value moved from `old` to `new`
    TableEntry {
        state: State,
        action: Direction,
        old: f64,
        new: f64,
    },
    /// A buffered episode was backed up and cleared
    EpisodeBackup { steps: usize, updated: usize },
    /// The unit of `action` was corrected by `error`
    UnitCorrection { action: Direction, error: f64 },
}

/// Everything observed during one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: State,
    pub action: Direction,
    pub explored: bool,
    pub destination: Position,
    pub next_state: State,
    pub reward: f64,
    pub found_food: bool,
    pub update: Option<ValueUpdate>,
}

/// Decision unit owned by one agent.
#[derive(Debug, Clone)]
pub enum LearningStrategy {
    Random,
    OdorFollowing,
    MonteCarlo(MonteCarloControl),
    QLearning(QLearning),
    Perceptron(PerceptronEnsemble),
}

impl LearningStrategy {
    pub fn new(kind: StrategyKind, config: &LearningConfig) -> Self {
        match kind {
            StrategyKind::Random => LearningStrategy::Random,
            StrategyKind::OdorFollowing => LearningStrategy::OdorFollowing,
            StrategyKind::MonteCarlo => LearningStrategy::MonteCarlo(MonteCarloControl::new(
                config.learning_rate,
                config.discount_factor,
            )),
            StrategyKind::QLearning => LearningStrategy::QLearning(QLearning::new(
                config.learning_rate,
                config.discount_factor,
            )),
            StrategyKind::Perceptron => {
                LearningStrategy::Perceptron(PerceptronEnsemble::new(config.perceptron_rate))
            }
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            LearningStrategy::Random => StrategyKind::Random,
            LearningStrategy::OdorFollowing => StrategyKind::OdorFollowing,
            LearningStrategy::MonteCarlo(_) => StrategyKind::MonteCarlo,
            LearningStrategy::QLearning(_) => StrategyKind::QLearning,
            LearningStrategy::Perceptron(_) => StrategyKind::Perceptron,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().label()
    }

    pub fn value_store(&self) -> Option<&dyn ValueStore> {
        match self {
            LearningStrategy::MonteCarlo(mc) => Some(mc.q_table()),
            LearningStrategy::QLearning(q) => Some(q.q_table()),
            LearningStrategy::Perceptron(p) => Some(p),
            LearningStrategy::Random | LearningStrategy::OdorFollowing => None,
        }
    }

    pub fn value_store_mut(&mut self) -> Option<&mut dyn ValueStore> {
        match self {
            LearningStrategy::MonteCarlo(mc) => Some(mc.q_table_mut()),
            LearningStrategy::QLearning(q) => Some(q.q_table_mut()),
            LearningStrategy::Perceptron(p) => Some(p),
            LearningStrategy::Random | LearningStrategy::OdorFollowing => None,
        }
    }

    /// Pick a direction from `position` and learn from the resulting transition.
    ///
    /// The environment is not modified; the caller moves the agent to
    /// `Step::destination` and settles any food found there.
    pub fn choose_and_learn<R: Rng + ?Sized>(
        &mut self,
        position: Position,
        last_action: Option<Direction>,
        ctx: &StepContext<'_>,
        rng: &mut R,
        log: &mut EpisodeLog,
    ) -> Step {
        let StepContext {
            env,
            learning,
            rewards,
        } = *ctx;
        let state = env.perceive(position);
        let odor_before = env.odor_at_position(position);

        let choice = match self {
            LearningStrategy::Random => Choice {
                direction: policy::random_direction(rng),
                explored: false,
                scores: [0.0; 4],
            },
            LearningStrategy::OdorFollowing => {
                let scores = state.inputs();
                Choice {
                    direction: policy::pick(&policy::best_directions(&scores), rng),
                    explored: false,
                    scores,
                }
            }
            LearningStrategy::MonteCarlo(mc) => {
                policy::choose(mc.q_table().scores(&state), last_action, learning, rng)
            }
            LearningStrategy::QLearning(q) => {
                policy::choose(q.scores(&state), last_action, learning, rng)
            }
            LearningStrategy::Perceptron(p) => {
                policy::choose_firing(p.activations(&state), last_action, learning, rng)
            }
        };

        let action = choice.direction;
        let destination = env.step(position, action);
        let found_food = env.check_food(destination).is_some();
        let odor_after = env.odor_at_position(destination);
        let next_state = env.perceive(destination);
        let reward = policy::step_reward(rewards, found_food, odor_before, odor_after);

        log.add(format!(
            "position: {position}, odor: {odor_before}, state: {state}\n\
             scores: {:?}, action: {action}, explored: {}\n\
             reward: {reward:.2}, next state: {next_state}",
            choice.scores, choice.explored
        ));

        let update = match self {
            LearningStrategy::Random | LearningStrategy::OdorFollowing => None,
            LearningStrategy::QLearning(q) => {
                let (old, new) = q.learn(state, action, reward, &next_state);
                Some(ValueUpdate::TableEntry {
                    state,
                    action,
                    old,
                    new,
                })
            }
            LearningStrategy::MonteCarlo(mc) => {
                mc.record(EpisodeStep::new(state, action, reward));
                if found_food {
                    let (steps, updated) = mc.finish_episode();
                    Some(ValueUpdate::EpisodeBackup { steps, updated })
                } else {
                    None
                }
            }
            LearningStrategy::Perceptron(p) if !choice.explored => {
                let error = p.learn(&state, action, reward > 0.0);
                Some(ValueUpdate::UnitCorrection { action, error })
            }
            LearningStrategy::Perceptron(_) => None,
        };

        if let Some(update) = &update {
            log.add(format!("update: {update:?}"));
        }

        Step {
            state,
            action,
            explored: choice.explored,
            destination,
            next_state,
            reward,
            found_food,
            update,
        }
    }
}
