//! Configuration value object for a simulation.
//!
//! Read once when the environment and population are built. Settings
//! actions on [`crate::Simulation`] may change selected fields between ticks.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    episode_log::DEFAULT_RETENTION,
    learning::StrategyKind,
    types::Rgb,
};

/// Constants shared by the learning strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Step size α for tabular updates
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Probability ε of replacing the greedy choice with a random direction
    pub exploration_rate: f64,
    /// Added to the score of the direction that undoes the previous move
    pub reverse_penalty: f64,
    /// Step size η of the perceptron rule
    pub perceptron_rate: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.1,
            reverse_penalty: -2.0,
            perceptron_rate: 0.1,
        }
    }
}

/// Per-step reward constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Paid on every step
    pub step_penalty: f64,
    /// Added when the step lands on food
    pub food_bonus: f64,
    /// Weight of the clamped odor change; zero disables shaping
    pub odor_gradient_weight: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: -0.2,
            food_bonus: 10.0,
            odor_gradient_weight: 0.0,
        }
    }
}

/// Display colors per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub background: Rgb,
    pub food: Rgb,
    pub random: Rgb,
    pub odor: Rgb,
    pub monte_carlo: Rgb,
    pub q_learning: Rgb,
    pub perceptron: Rgb,
    pub inert: Rgb,
}

impl ColorScheme {
    pub fn for_kind(&self, kind: StrategyKind) -> Rgb {
        match kind {
            StrategyKind::Random => self.random,
            StrategyKind::OdorFollowing => self.odor,
            StrategyKind::MonteCarlo => self.monte_carlo,
            StrategyKind::QLearning => self.q_learning,
            StrategyKind::Perceptron => self.perceptron,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: Rgb::WHITE,
            food: Rgb::GREEN,
            random: Rgb::RED,
            odor: Rgb::ORANGE,
            monte_carlo: Rgb::RED,
            q_learning: Rgb::RED,
            perceptron: Rgb::PURPLE,
            inert: Rgb::GRAY,
        }
    }
}

/// Where learned values live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub directory: PathBuf,
    pub monte_carlo_file: String,
    pub q_learning_file: String,
    pub perceptron_file: String,
}

impl PersistenceConfig {
    /// Value file for a learning strategy, `None` for strategies that learn nothing.
    pub fn path_for(&self, kind: StrategyKind) -> Option<PathBuf> {
        let file = match kind {
            StrategyKind::MonteCarlo => &self.monte_carlo_file,
            StrategyKind::QLearning => &self.q_learning_file,
            StrategyKind::Perceptron => &self.perceptron_file,
            StrategyKind::Random | StrategyKind::OdorFollowing => return None,
        };
        Some(self.directory.join(file))
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            monte_carlo_file: "Monte-Carlo-Methode.csv".to_string(),
            q_learning_file: "Q-Learning.csv".to_string(),
            perceptron_file: "Perceptron.csv".to_string(),
        }
    }
}

/// Everything needed to build a simulation.
///
/// # Examples
///
/// ```
/// use antforage::app::SimulationConfig;
/// use antforage::learning::StrategyKind;
///
/// let config = SimulationConfig::default()
///     .with_grid(40, 30)
///     .with_strategy(StrategyKind::MonteCarlo)
///     .with_agents(3)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Pixel size of one cell for the renderer
    pub cell_size: u32,
    /// Energy each new agent starts with
    pub initial_energy: u32,
    pub desired_food: usize,
    pub food_calories: u32,
    /// Strategy given to agents spawned without an explicit choice
    pub strategy: StrategyKind,
    /// Agents spawned when the simulation is built
    pub initial_agents: usize,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    pub learning: LearningConfig,
    pub rewards: RewardConfig,
    pub colors: ColorScheme,
    pub persistence: PersistenceConfig,
    /// Episode-log periods kept per agent
    pub log_retention: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 100,
            cell_size: 10,
            initial_energy: 1000,
            desired_food: 5,
            food_calories: 120,
            strategy: StrategyKind::QLearning,
            initial_agents: 1,
            seed: None,
            learning: LearningConfig::default(),
            rewards: RewardConfig::default(),
            colors: ColorScheme::default(),
            persistence: PersistenceConfig::default(),
            log_retention: DEFAULT_RETENTION,
        }
    }
}

impl SimulationConfig {
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_energy(mut self, energy: u32) -> Self {
        self.initial_energy = energy;
        self
    }

    pub fn with_food(mut self, desired: usize, calories: u32) -> Self {
        self.desired_food = desired;
        self.food_calories = calories;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_agents(mut self, count: usize) -> Self {
        self.initial_agents = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_learning(mut self, learning: LearningConfig) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardConfig) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_persistence_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.persistence.directory = directory.into();
        self
    }

    /// Check the invariants the simulation relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });

        if self.grid_width == 0 || self.grid_height == 0 {
            return invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        if self.cell_size == 0 {
            return invalid("cell_size must be positive".to_string());
        }

        let unit_interval = [
            ("learning_rate", self.learning.learning_rate),
            ("discount_factor", self.learning.discount_factor),
            ("exploration_rate", self.learning.exploration_rate),
            ("perceptron_rate", self.learning.perceptron_rate),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        if !self.learning.reverse_penalty.is_finite() {
            return invalid("reverse_penalty must be finite".to_string());
        }
        Ok(())
    }

    /// Read a JSON configuration file; absent fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create config {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
