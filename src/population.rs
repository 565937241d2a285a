//! The collection of agents and the factory that spawns them.

use rand::Rng;
use tracing::{debug, warn};

use crate::{
    Result,
    agent::Agent,
    app::SimulationConfig,
    error::Error,
    identifiers::AgentId,
    learning::{LearningStrategy, StrategyKind},
    types::Position,
    world::{Environment, random_interior},
};

/// Every agent of a simulation, in spawn order.
#[derive(Debug, Clone)]
pub struct AgentPopulation {
    agents: Vec<Agent>,
    next_id: u32,
}

impl Default for AgentPopulation {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentPopulation {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawn `count` agents of `kind` at random interior cells.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        kind: StrategyKind,
        count: usize,
        config: &SimulationConfig,
        env: &Environment,
        rng: &mut R,
    ) -> Vec<AgentId> {
        let ids: Vec<AgentId> = (0..count)
            .map(|_| {
                let position = random_interior(env.width(), env.height(), rng);
                self.insert(kind, position, config)
            })
            .collect();
        debug!(count, strategy = %kind, "spawned agents");
        ids
    }

    /// Spawn one agent at an exact cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `position` is off the grid.
    pub fn spawn_at(
        &mut self,
        kind: StrategyKind,
        position: Position,
        config: &SimulationConfig,
        env: &Environment,
    ) -> Result<AgentId> {
        if !env.contains(position) {
            return Err(Error::PositionOutOfBounds {
                x: position.x as i64,
                y: position.y as i64,
                width: env.width(),
                height: env.height(),
            });
        }
        Ok(self.insert(kind, position, config))
    }

    /// Spawn by strategy and learning-method name.
    ///
    /// # Errors
    ///
    /// Unknown names are logged and returned as errors; nothing is spawned.
    pub fn spawn_named<R: Rng + ?Sized>(
        &mut self,
        strategy: &str,
        method: Option<&str>,
        count: usize,
        config: &SimulationConfig,
        env: &Environment,
        rng: &mut R,
    ) -> Result<Vec<AgentId>> {
        let kind = StrategyKind::from_names(strategy, method).inspect_err(|err| {
            warn!(%err, strategy, method, "agents not spawned");
        })?;
        Ok(self.spawn(kind, count, config, env, rng))
    }

    fn insert(&mut self, kind: StrategyKind, position: Position, config: &SimulationConfig) -> AgentId {
        let id = AgentId::new(self.next_id);
        self.next_id += 1;
        let strategy = LearningStrategy::new(kind, &config.learning);
        let agent = Agent::new(id, position, config.initial_energy, strategy)
            .with_log_retention(config.log_retention);
        self.agents.push(agent);
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents that still move.
    pub fn live_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.is_active()).count()
    }

    /// Remove every agent; numbering restarts at `001`.
    pub fn reset(&mut self) {
        self.agents.clear();
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn setup() -> (SimulationConfig, Environment, StdRng) {
        let config = SimulationConfig::default().with_grid(30, 20);
        let env = Environment::new(30, 20).unwrap();
        (config, env, StdRng::seed_from_u64(17))
    }

    #[test]
    fn test_spawn_assigns_sequential_ids() {
        let (config, env, mut rng) = setup();
        let mut population = AgentPopulation::new();

        let ids = population.spawn(StrategyKind::QLearning, 3, &config, &env, &mut rng);
        assert_eq!(ids, vec![AgentId::new(1), AgentId::new(2), AgentId::new(3)]);
        assert_eq!(population.len(), 3);
        assert_eq!(population.live_count(), 3);

        for agent in population.iter() {
            assert!(env.contains(agent.position()));
            assert!(agent.position().x >= 2 && agent.position().y >= 2);
            assert_eq!(agent.energy(), config.initial_energy);
        }
    }

    #[test]
    fn test_spawn_named_rejects_unknown_method() {
        let (config, env, mut rng) = setup();
        let mut population = AgentPopulation::new();

        let result = population.spawn_named("brain", Some("sarsa"), 2, &config, &env, &mut rng);
        assert!(matches!(result, Err(Error::UnknownLearningMethod { .. })));
        assert!(population.is_empty());

        let ids = population
            .spawn_named("brain", Some("Perceptron"), 1, &config, &env, &mut rng)
            .unwrap();
        assert_eq!(
            population.get(ids[0]).map(Agent::kind),
            Some(StrategyKind::Perceptron)
        );
    }

    #[test]
    fn test_spawn_at_checks_bounds() {
        let (config, env, _) = setup();
        let mut population = AgentPopulation::new();
        assert!(
            population
                .spawn_at(StrategyKind::Random, Position::new(30, 0), &config, &env)
                .is_err()
        );
        let id = population
            .spawn_at(StrategyKind::Random, Position::new(29, 19), &config, &env)
            .unwrap();
        assert_eq!(population.get(id).unwrap().position(), Position::new(29, 19));
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let (config, env, mut rng) = setup();
        let mut population = AgentPopulation::new();
        population.spawn(StrategyKind::Random, 2, &config, &env, &mut rng);
        population.reset();
        assert!(population.is_empty());

        let ids = population.spawn(StrategyKind::Random, 1, &config, &env, &mut rng);
        assert_eq!(ids, vec![AgentId::new(1)]);
    }
}
