//! Statistical summaries of a population

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::population::AgentPopulation;

/// Food found by the agents of one strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub agents: usize,
    pub food_found: u64,
    pub mean_food_found: f64,
}

/// Population-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub agents: usize,
    pub live_agents: usize,
    pub inert_agents: usize,
    pub total_food_found: u64,
    pub mean_food_found: f64,
    /// Sample standard deviation; zero with fewer than two agents
    pub std_dev_food_found: f64,
    pub max_food_found: u32,
    /// Keyed by strategy label
    pub by_strategy: BTreeMap<String, StrategyStats>,
}

impl PopulationStats {
    pub fn collect(population: &AgentPopulation) -> Self {
        let counts: Vec<f64> = population
            .iter()
            .map(|agent| f64::from(agent.food_found()))
            .collect();

        let mut by_strategy: BTreeMap<String, StrategyStats> = BTreeMap::new();
        for agent in population.iter() {
            let entry = by_strategy.entry(agent.kind().label().to_string()).or_default();
            entry.agents += 1;
            entry.food_found += u64::from(agent.food_found());
        }
        for entry in by_strategy.values_mut() {
            entry.mean_food_found = entry.food_found as f64 / entry.agents as f64;
        }

        let live_agents = population.live_count();
        Self {
            agents: population.len(),
            live_agents,
            inert_agents: population.len() - live_agents,
            total_food_found: population
                .iter()
                .map(|agent| u64::from(agent.food_found()))
                .sum(),
            mean_food_found: finite_or_zero(counts.iter().mean()),
            std_dev_food_found: finite_or_zero(counts.iter().std_dev()),
            max_food_found: population
                .iter()
                .map(|agent| agent.food_found())
                .max()
                .unwrap_or(0),
            by_strategy,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{app::SimulationConfig, learning::StrategyKind, world::Environment};

    #[test]
    fn test_empty_population() {
        let stats = PopulationStats::collect(&AgentPopulation::new());
        assert_eq!(stats.agents, 0);
        assert_eq!(stats.mean_food_found, 0.0);
        assert_eq!(stats.std_dev_food_found, 0.0);
        assert!(stats.by_strategy.is_empty());
    }

    #[test]
    fn test_groups_by_strategy() {
        let config = SimulationConfig::default().with_grid(20, 20);
        let env = Environment::new(20, 20).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut population = AgentPopulation::new();
        population.spawn(StrategyKind::Random, 2, &config, &env, &mut rng);
        population.spawn(StrategyKind::QLearning, 1, &config, &env, &mut rng);

        let stats = PopulationStats::collect(&population);
        assert_eq!(stats.agents, 3);
        assert_eq!(stats.live_agents, 3);
        assert_eq!(stats.by_strategy["random"].agents, 2);
        assert_eq!(stats.by_strategy["Q-Learning"].agents, 1);
        assert_eq!(stats.total_food_found, 0);
    }
}
