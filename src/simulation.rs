//! The tick loop tying the environment and the population together.
//!
//! A [`Simulation`] owns all mutable state: grid, food, agents, value
//! stores and the random number generator. Nothing is shared, so a host
//! may drive it from any single thread.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Result,
    agent::{Agent, AgentStep, FoodEvent},
    app::SimulationConfig,
    episode_log::PeriodEvent,
    error::Error,
    identifiers::AgentId,
    learning::StrategyKind,
    population::AgentPopulation,
    types::{Position, Rgb},
    value_store::ValueSnapshot,
    world::Environment,
};

/// An agent whose turn failed; the rest of the tick still ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub agent: AgentId,
    pub message: String,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    /// Agents that moved
    pub moved: usize,
    pub food: Vec<FoodEvent>,
    pub exhausted: Vec<AgentId>,
    #[serde(skip)]
    pub periods: Vec<PeriodEvent>,
    pub failures: Vec<AgentFailure>,
    /// Active agents after the tick
    pub live_agents: usize,
}

/// One colored cell for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub position: Position,
    pub color: Rgb,
}

/// Read-only frame data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub cell_size: u32,
    pub width: usize,
    pub height: usize,
    pub background: Rgb,
    pub agents: Vec<Sprite>,
    pub foods: Vec<Sprite>,
}

/// Environment, population and RNG driven one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    env: Environment,
    population: AgentPopulation,
    rng: StdRng,
    seed: u64,
    tick: u64,
}

impl Simulation {
    /// Build the grid, stock it with food and spawn the initial agents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let env = Environment::from_config(&config, &mut rng)?;

        let mut sim = Self {
            config,
            env,
            population: AgentPopulation::new(),
            rng,
            seed,
            tick: 0,
        };
        sim.spawn_agents(sim.config.initial_agents);
        info!(
            seed,
            width = sim.env.width(),
            height = sim.env.height(),
            agents = sim.population.len(),
            "simulation created"
        );
        Ok(sim)
    }

    /// Use a prepared environment and start with no agents.
    pub fn with_environment(config: SimulationConfig, env: Environment) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            env,
            population: AgentPopulation::new(),
            seed,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn population(&self) -> &AgentPopulation {
        &self.population
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.population.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.population.get_mut(id)
    }

    /// Seed of the simulation's random number generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn all_inert(&self) -> bool {
        self.population.live_count() == 0
    }

    /// Advance every active agent by one step, in spawn order.
    ///
    /// An agent whose step fails is reported in [`TickReport::failures`]
    /// and skipped; the remaining agents still move.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let Self {
            config,
            env,
            population,
            rng,
            ..
        } = self;

        for agent in population.iter_mut() {
            match agent.step(env, config, rng) {
                Ok(Some(step)) => record_step(&mut report, step),
                Ok(None) => {}
                Err(err) => {
                    warn!(agent = %agent.id(), %err, "agent step failed");
                    report.failures.push(AgentFailure {
                        agent: agent.id(),
                        message: err.to_string(),
                    });
                }
            }
        }

        report.live_agents = self.population.live_count();
        report
    }

    /// Change the target food count; missing food is created immediately.
    pub fn set_desired_food(&mut self, desired: usize) {
        self.config.desired_food = desired;
        self.env.set_desired_food(desired, &mut self.rng);
    }

    /// Calorie value for food created from now on.
    pub fn set_food_calories(&mut self, calories: u32) {
        self.config.food_calories = calories;
        self.env.set_food_calories(calories);
    }

    /// Strategy for agents spawned without an explicit choice.
    pub fn set_spawn_strategy(&mut self, kind: StrategyKind) {
        self.config.strategy = kind;
    }

    /// Spawn `count` agents of the configured strategy.
    pub fn spawn_agents(&mut self, count: usize) -> Vec<AgentId> {
        let kind = self.config.strategy;
        self.spawn_kind(kind, count)
    }

    pub fn spawn_kind(&mut self, kind: StrategyKind, count: usize) -> Vec<AgentId> {
        self.population
            .spawn(kind, count, &self.config, &self.env, &mut self.rng)
    }

    /// Spawn by strategy and learning-method name, e.g. `("brain", Some("Q-Learning"))`.
    pub fn spawn_named(
        &mut self,
        strategy: &str,
        method: Option<&str>,
        count: usize,
    ) -> Result<Vec<AgentId>> {
        self.population.spawn_named(
            strategy,
            method,
            count,
            &self.config,
            &self.env,
            &mut self.rng,
        )
    }

    pub fn spawn_agent_at(&mut self, kind: StrategyKind, position: Position) -> Result<AgentId> {
        self.population
            .spawn_at(kind, position, &self.config, &self.env)
    }

    /// Remove every agent and rebuild the food from the current settings.
    pub fn reset(&mut self) {
        self.population.reset();
        self.env.clear_food();
        self.env.set_food_calories(self.config.food_calories);
        self.env.set_desired_food(self.config.desired_food, &mut self.rng);
        self.tick = 0;
        debug!("simulation reset");
    }

    /// Agent and food cells with their display colors.
    pub fn render_snapshot(&self) -> RenderSnapshot {
        let colors = &self.config.colors;
        let agents = self
            .population
            .iter()
            .map(|agent| Sprite {
                position: agent.position(),
                color: if agent.is_active() {
                    colors.for_kind(agent.kind())
                } else {
                    colors.inert
                },
            })
            .collect();
        let foods = self
            .env
            .foods()
            .iter()
            .map(|food| Sprite {
                position: food.position,
                color: colors.food,
            })
            .collect();

        RenderSnapshot {
            cell_size: self.config.cell_size,
            width: self.env.width(),
            height: self.env.height(),
            background: colors.background,
            agents,
            foods,
        }
    }

    /// Full retained trace of an agent.
    pub fn agent_log(&self, id: AgentId) -> Result<String> {
        Ok(self.find(id)?.log().full_text())
    }

    /// Most recently closed period of an agent's trace.
    pub fn agent_log_latest(&self, id: AgentId) -> Result<Option<String>> {
        Ok(self.find(id)?.log().latest_closed().map(str::to_string))
    }

    /// Copy an agent's learned values out.
    ///
    /// # Errors
    ///
    /// [`Error::AgentNotFound`], or [`Error::NoValueStore`] for agents that
    /// do not learn.
    pub fn export_values(&self, id: AgentId) -> Result<ValueSnapshot> {
        let agent = self.find(id)?;
        agent
            .strategy()
            .value_store()
            .map(|store| store.export_snapshot())
            .ok_or_else(|| Error::NoValueStore {
                strategy: agent.kind().label().to_string(),
            })
    }

    /// Replace an agent's learned values.
    pub fn import_values(&mut self, id: AgentId, snapshot: &ValueSnapshot) -> Result<()> {
        let agent = self
            .population
            .get_mut(id)
            .ok_or_else(|| Error::AgentNotFound { id: id.to_string() })?;
        let kind = agent.kind();
        agent
            .strategy_mut()
            .value_store_mut()
            .ok_or_else(|| Error::NoValueStore {
                strategy: kind.label().to_string(),
            })?
            .import_snapshot(snapshot)
    }

    fn find(&self, id: AgentId) -> Result<&Agent> {
        self.population
            .get(id)
            .ok_or_else(|| Error::AgentNotFound { id: id.to_string() })
    }
}

fn record_step(report: &mut TickReport, step: AgentStep) {
    report.moved += 1;
    if let Some(food) = step.food {
        report.food.push(food);
    }
    if step.exhausted {
        report.exhausted.push(step.agent);
    }
    report.periods.push(step.period);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> SimulationConfig {
        SimulationConfig::default()
            .with_grid(20, 20)
            .with_food(3, 15)
            .with_agents(2)
            .with_seed(seed)
    }

    #[test]
    fn test_new_spawns_agents_and_food() {
        let sim = Simulation::new(small(1)).unwrap();
        assert_eq!(sim.population().len(), 2);
        assert_eq!(sim.environment().foods().len(), 3);
        assert_eq!(sim.seed(), 1);
        assert!(sim.environment().scent().peak() > 0);
    }

    #[test]
    fn test_tick_moves_every_live_agent() {
        let mut sim = Simulation::new(small(2)).unwrap();
        let report = sim.tick();
        assert_eq!(report.tick, 1);
        assert_eq!(report.moved, 2);
        assert_eq!(report.periods.len(), 2);
        assert_eq!(report.live_agents, 2);
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = Simulation::new(small(99)).unwrap();
        let mut b = Simulation::new(small(99)).unwrap();
        for _ in 0..50 {
            a.tick();
            b.tick();
        }
        let positions = |sim: &Simulation| -> Vec<Position> {
            sim.population().iter().map(|agent| agent.position()).collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_failing_agent_does_not_abort_tick() {
        let config = small(3).with_agents(0);
        let mut sim = Simulation::new(config).unwrap();
        let stray = sim.spawn_agent_at(StrategyKind::Random, Position::new(19, 19)).unwrap();
        sim.spawn_agent_at(StrategyKind::Random, Position::new(5, 5)).unwrap();

        // Shrink the grid under the first agent
        *sim.environment_mut() = Environment::new(10, 10).unwrap();

        let report = sim.tick();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].agent, stray);
        assert_eq!(report.moved, 1);
    }

    #[test]
    fn test_settings_actions() {
        let mut sim = Simulation::new(small(4)).unwrap();
        sim.set_desired_food(6);
        assert_eq!(sim.environment().foods().len(), 6);

        sim.set_food_calories(40);
        sim.set_spawn_strategy(StrategyKind::Perceptron);
        let ids = sim.spawn_agents(1);
        assert_eq!(sim.agent(ids[0]).unwrap().kind(), StrategyKind::Perceptron);

        sim.reset();
        assert!(sim.population().is_empty());
        assert_eq!(sim.environment().foods().len(), 6);
        assert!(sim.environment().foods().iter().all(|food| food.calories == 40));
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn test_render_snapshot_colors() {
        let mut sim = Simulation::new(small(5).with_agents(0)).unwrap();
        sim.spawn_kind(StrategyKind::Perceptron, 1);
        let snapshot = sim.render_snapshot();

        assert_eq!(snapshot.cell_size, 10);
        assert_eq!(snapshot.agents.len(), 1);
        assert_eq!(snapshot.agents[0].color, sim.config().colors.perceptron);
        assert_eq!(snapshot.foods.len(), 3);
        assert!(snapshot.foods.iter().all(|food| food.color == Rgb::GREEN));
    }

    #[test]
    fn test_logs_and_values_by_agent() {
        let mut sim = Simulation::new(small(6).with_agents(0)).unwrap();
        let learner = sim.spawn_kind(StrategyKind::QLearning, 1)[0];
        let wanderer = sim.spawn_kind(StrategyKind::Random, 1)[0];
        sim.tick();

        assert!(sim.agent_log(learner).unwrap().contains("Ant: 001"));
        assert!(sim.agent_log_latest(learner).unwrap().is_some());
        assert!(matches!(
            sim.agent_log(AgentId::new(42)),
            Err(Error::AgentNotFound { .. })
        ));

        let snapshot = sim.export_values(learner).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(matches!(
            sim.export_values(wanderer),
            Err(Error::NoValueStore { .. })
        ));

        sim.import_values(learner, &ValueSnapshot::default_for(snapshot.kind()))
            .unwrap();
        assert_eq!(sim.export_values(learner).unwrap().len(), 4);
    }
}
