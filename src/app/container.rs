//! Dependency injection container for the foraging application.
//!
//! The container owns the persistence adapter and wires learned values
//! into newly spawned agents.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, error, warn};

use super::config::SimulationConfig;
use crate::{
    Result,
    adapters::CsvRepository,
    error::Error,
    identifiers::AgentId,
    learning::StrategyKind,
    ports::ValueRepository,
    simulation::Simulation,
    value_store::{SnapshotKind, ValueSnapshot},
};

fn snapshot_kind(kind: StrategyKind) -> Option<SnapshotKind> {
    match kind {
        StrategyKind::MonteCarlo | StrategyKind::QLearning => Some(SnapshotKind::Table),
        StrategyKind::Perceptron => Some(SnapshotKind::Perceptron),
        StrategyKind::Random | StrategyKind::OdorFollowing => None,
    }
}

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use antforage::app::{App, SimulationConfig};
///
/// let app = App::new();
/// let mut sim = app.create_simulation(SimulationConfig::default().with_seed(42))?;
/// sim.tick();
/// # Ok::<(), antforage::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use antforage::app::App;
/// use antforage::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for learned values
    repository: Arc<dyn ValueRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults: CSV value files and no
    /// default seed.
    pub fn new() -> Self {
        Self {
            repository: Arc::new(CsvRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn repository(&self) -> Arc<dyn ValueRepository + Send + Sync> {
        Arc::clone(&self.repository)
    }

    /// Build a simulation and seed its learning agents with persisted values.
    pub fn create_simulation(&self, mut config: SimulationConfig) -> Result<Simulation> {
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        let mut sim = Simulation::new(config)?;
        let ids: Vec<AgentId> = sim.population().iter().map(|agent| agent.id()).collect();
        for id in ids {
            self.seed_agent(&mut sim, id)?;
        }
        Ok(sim)
    }

    /// Spawn agents of `kind`, seeding learners with persisted values.
    pub fn spawn_agents(
        &self,
        sim: &mut Simulation,
        kind: StrategyKind,
        count: usize,
    ) -> Result<Vec<AgentId>> {
        let ids = sim.spawn_kind(kind, count);
        for &id in &ids {
            self.seed_agent(sim, id)?;
        }
        Ok(ids)
    }

    /// Load the persisted values for `kind`.
    ///
    /// Missing or unreadable sources fall back to the default record set
    /// with a warning. Returns `None` for strategies that learn nothing.
    pub fn load_values(&self, kind: StrategyKind, config: &SimulationConfig) -> Option<ValueSnapshot> {
        let snapshot_kind = snapshot_kind(kind)?;
        let path = config.persistence.path_for(kind)?;

        match self.repository.load(snapshot_kind, &path) {
            Ok(snapshot) => {
                debug!(path = %path.display(), entries = snapshot.len(), "loaded values");
                Some(snapshot)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "using default values");
                Some(ValueSnapshot::default_for(snapshot_kind))
            }
        }
    }

    /// Seed one agent from its method's value file.
    ///
    /// Values that fail to import are replaced by the defaults.
    pub fn seed_agent(&self, sim: &mut Simulation, id: AgentId) -> Result<()> {
        let kind = sim
            .agent(id)
            .map(|agent| agent.kind())
            .ok_or_else(|| Error::AgentNotFound { id: id.to_string() })?;

        let Some(snapshot) = self.load_values(kind, sim.config()) else {
            return Ok(());
        };
        if let Err(err) = sim.import_values(id, &snapshot) {
            warn!(agent = %id, %err, "invalid values, using defaults");
            sim.import_values(id, &ValueSnapshot::default_for(snapshot.kind()))?;
        }
        Ok(())
    }

    /// Write an agent's values to its method's value file.
    ///
    /// Failures are logged and returned; the simulation is unaffected.
    pub fn save_values(&self, sim: &Simulation, id: AgentId) -> Result<PathBuf> {
        let kind = sim
            .agent(id)
            .map(|agent| agent.kind())
            .ok_or_else(|| Error::AgentNotFound { id: id.to_string() })?;
        let snapshot = sim.export_values(id)?;
        let path = sim
            .config()
            .persistence
            .path_for(kind)
            .ok_or_else(|| Error::NoValueStore {
                strategy: kind.label().to_string(),
            })?;

        self.repository
            .save(&snapshot, &path)
            .inspect_err(|err| error!(agent = %id, path = %path.display(), %err, "failed to save values"))?;
        debug!(agent = %id, path = %path.display(), entries = snapshot.len(), "saved values");
        Ok(path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating an App with custom dependencies.
pub struct AppBuilder {
    repository: Option<Arc<dyn ValueRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    /// Set a custom value repository.
    pub fn with_repository<R: ValueRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Set default random seed for simulations without one.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Unset dependencies use production defaults.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(CsvRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
