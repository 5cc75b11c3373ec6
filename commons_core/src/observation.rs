//! Observation builders.
//!
//! After every step the engine projects its post-transition state into one
//! [`Observation`] per agent. Three variants share one capability, the
//! [`ObservationBuilder`] trait, and the variant is picked once from the
//! config when the engine is built:
//!
//! - [`FullObservation`]: everyone sees everything
//! - [`LocalGraphObservation`]: agents see their neighbors only
//! - [`NoisyObservation`]: wraps either of the above and perturbs the
//!   reported stock with Gaussian noise from a run-scoped RNG
//!
//! Only the noisy variant draws random numbers. Draws happen in agent-index
//! order, one per agent per step, so a fixed seed replays bit for bit.

use crate::config::{EngineConfig, NeighborGraph, ObservationMode, Visibility};
use crate::error::EngineError;
use commons_env::{AgentId, Observation, PeerRecord};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Salt separating the observation noise stream from other seeded streams.
const NOISE_SEED_SALT: u64 = 0x9e3779b97f4a7c15;

/// Post-transition values an observation is built from.
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    pub step: u32,
    pub stock: f64,
    pub pool: Option<f64>,
    pub wealth: &'a [f64],
    pub harvests: &'a [f64],
    pub contributions: &'a [f64],
}

impl StepView<'_> {
    fn peer(&self, agent: AgentId) -> PeerRecord {
        let i = agent.index();
        PeerRecord {
            agent,
            wealth: self.wealth[i],
            harvest: self.harvests[i],
            contribution: self.contributions[i],
        }
    }

    pub fn num_agents(&self) -> usize {
        self.wealth.len()
    }
}

/// Produces an agent's observation from a step's post-transition values.
pub trait ObservationBuilder: Send {
    /// Builds the observation for one agent.
    fn observe(&mut self, agent: AgentId, view: &StepView<'_>) -> Observation;

    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Builds observations for every agent in index order.
    fn observe_all(&mut self, view: &StepView<'_>) -> Vec<Observation> {
        (0..view.num_agents())
            .map(|i| self.observe(AgentId::from_index(i), view))
            .collect()
    }
}

/// Full observability: `(R', w', h̃, c)` for everyone.
#[derive(Debug, Clone, Default)]
pub struct FullObservation;

impl ObservationBuilder for FullObservation {
    fn observe(&mut self, agent: AgentId, view: &StepView<'_>) -> Observation {
        Observation {
            agent,
            step: view.step,
            stock: view.stock,
            pool: view.pool,
            own_wealth: view.wealth[agent.index()],
            peers: (0..view.num_agents())
                .map(|j| view.peer(AgentId::from_index(j)))
                .collect(),
        }
    }

    fn name(&self) -> &'static str {
        "full"
    }
}

/// Local-graph observability: own wealth plus neighbors' records.
#[derive(Debug, Clone)]
pub struct LocalGraphObservation {
    graph: NeighborGraph,
}

impl LocalGraphObservation {
    pub fn new(graph: NeighborGraph) -> Self {
        Self { graph }
    }
}

impl ObservationBuilder for LocalGraphObservation {
    fn observe(&mut self, agent: AgentId, view: &StepView<'_>) -> Observation {
        Observation {
            agent,
            step: view.step,
            stock: view.stock,
            pool: view.pool,
            own_wealth: view.wealth[agent.index()],
            peers: self
                .graph
                .neighbors(agent)
                .filter(|j| *j != agent)
                .map(|j| view.peer(j))
                .collect(),
        }
    }

    fn name(&self) -> &'static str {
        "local_graph"
    }
}

/// Reports `R' + η`, `η ~ Normal(0, σ²)`, on top of another builder.
///
/// The true stock is never touched; only the reported figure is noisy.
pub struct NoisyObservation {
    inner: Box<dyn ObservationBuilder>,
    rng: ChaCha8Rng,
    noise: Normal<f64>,
}

impl NoisyObservation {
    /// Creates a noisy wrapper with its own seeded RNG.
    pub fn new(
        inner: Box<dyn ObservationBuilder>,
        std_dev: f64,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let noise = Normal::new(0.0, std_dev)
            .map_err(|e| EngineError::invalid(format!("stock noise: {}", e)))?;
        Ok(Self {
            inner,
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_mul(NOISE_SEED_SALT)),
            noise,
        })
    }
}

impl ObservationBuilder for NoisyObservation {
    fn observe(&mut self, agent: AgentId, view: &StepView<'_>) -> Observation {
        let mut obs = self.inner.observe(agent, view);
        obs.stock += self.noise.sample(&mut self.rng);
        obs
    }

    fn name(&self) -> &'static str {
        "noisy"
    }
}

/// Builds the observation variant named by the config.
pub fn builder_for(config: &EngineConfig) -> Result<Box<dyn ObservationBuilder>, EngineError> {
    let base: Box<dyn ObservationBuilder> = match config.observation.visibility() {
        Visibility::Full => Box::new(FullObservation),
        Visibility::LocalGraph => Box::new(LocalGraphObservation::new(config.neighbors.clone())),
    };

    match config.observation {
        ObservationMode::Noisy { .. } => Ok(Box::new(NoisyObservation::new(
            base,
            config.stock_noise_std(),
            config.seed,
        )?)),
        ObservationMode::Full | ObservationMode::LocalGraph => Ok(base),
    }
}
