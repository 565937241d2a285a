//! A single foraging agent and its per-tick transition.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    app::SimulationConfig,
    episode_log::{EpisodeLog, PeriodEvent},
    error::Error,
    identifiers::{AgentId, FoodId},
    learning::{LearningStrategy, StepContext, StrategyKind, ValueUpdate},
    types::{Direction, Position},
    world::{Environment, FoodFate},
};

/// Liveness of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Moves once per tick
    Active,
    /// Out of energy; skipped by every later tick
    Inert,
}

/// An agent reached food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEvent {
    pub agent: AgentId,
    pub food: FoodId,
    pub position: Position,
    pub calories: u32,
    pub fate: FoodFate,
}

/// Result of one active agent's turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStep {
    pub agent: AgentId,
    pub from: Position,
    pub to: Position,
    pub action: Direction,
    pub explored: bool,
    pub reward: f64,
    pub food: Option<FoodEvent>,
    pub update: Option<ValueUpdate>,
    pub period: PeriodEvent,
    /// The agent ran out of energy on this step
    pub exhausted: bool,
}

/// Per-ant state: position, energy, strategy and bookkeeping.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    position: Position,
    energy: u32,
    strategy: LearningStrategy,
    last_action: Option<Direction>,
    food_found: u32,
    steps: u64,
    status: AgentStatus,
    log: EpisodeLog,
}

impl Agent {
    /// An agent with no energy starts inert.
    pub fn new(id: AgentId, position: Position, energy: u32, strategy: LearningStrategy) -> Self {
        let log = EpisodeLog::new(id, strategy.name());
        let status = if energy == 0 {
            AgentStatus::Inert
        } else {
            AgentStatus::Active
        };
        Self {
            id,
            position,
            energy,
            strategy,
            last_action: None,
            food_found: 0,
            steps: 0,
            status,
            log,
        }
    }

    pub fn with_log_retention(mut self, periods: usize) -> Self {
        self.log = self.log.with_retention(periods);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn strategy(&self) -> &LearningStrategy {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut LearningStrategy {
        &mut self.strategy
    }

    pub fn last_action(&self) -> Option<Direction> {
        self.last_action
    }

    pub fn food_found(&self) -> u32 {
        self.food_found
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    pub fn log(&self) -> &EpisodeLog {
        &self.log
    }

    /// One step in `direction` with toroidal wrap.
    pub fn move_direction(&mut self, direction: Direction, width: usize, height: usize) {
        self.position = self.position.stepped(direction, width, height);
        self.last_action = Some(direction);
    }

    /// Run this agent's turn.
    ///
    /// Returns `Ok(None)` for an inert agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if the agent's position is not
    /// on `env`'s grid. The agent is left unchanged.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        env: &mut Environment,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Option<AgentStep>> {
        if !self.is_active() {
            return Ok(None);
        }
        if !env.contains(self.position) {
            return Err(Error::PositionOutOfBounds {
                x: self.position.x as i64,
                y: self.position.y as i64,
                width: env.width(),
                height: env.height(),
            });
        }

        self.log.add(format!(
            "Ant: {}, strategy: {}, position: {}, energy: {}, food found: {}",
            self.id,
            self.strategy.name(),
            self.position,
            self.energy,
            self.food_found
        ));

        let from = self.position;
        let ctx = StepContext::new(env, &config.learning, &config.rewards);
        let decision = self
            .strategy
            .choose_and_learn(from, self.last_action, &ctx, rng, &mut self.log);
        self.move_direction(decision.action, env.width(), env.height());
        self.steps += 1;

        let food = self.eat(env, rng);

        self.energy = self.energy.saturating_sub(1);
        let exhausted = self.energy == 0;
        if exhausted {
            self.status = AgentStatus::Inert;
            self.log.add("energy exhausted");
        }

        Ok(Some(AgentStep {
            agent: self.id,
            from,
            to: self.position,
            action: decision.action,
            explored: decision.explored,
            reward: decision.reward,
            food,
            update: decision.update,
            period: self.log.advance_period(),
            exhausted,
        }))
    }

    fn eat<R: Rng + ?Sized>(&mut self, env: &mut Environment, rng: &mut R) -> Option<FoodEvent> {
        let (food, calories) = env
            .check_food(self.position)
            .map(|food| (food.id, food.calories))?;
        let fate = env.consume_food(food, rng)?;

        self.food_found += 1;
        self.energy = self.energy.saturating_add(calories);
        self.log.add(format!("found food {food} (+{calories}), {fate:?}"));

        Some(FoodEvent {
            agent: self.id,
            food,
            position: self.position,
            calories,
            fate,
        })
    }
}
