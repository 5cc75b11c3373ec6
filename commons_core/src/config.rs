//! Run configuration.
//!
//! An [`EngineConfig`] is built once before a run and never mutated. Every
//! field has a default, so configs can be written sparsely in JSON or
//! built in code with `..Default::default()`.

use crate::error::EngineError;
use commons_env::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Regeneration law for the shared stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerationLaw {
    /// `R' = R - H + γ·R·(1 - R/K) + G`
    #[default]
    Logistic,

    /// `R' = R - H + γ + G`
    Linear,
}

/// How the governance pool evolves between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolMode {
    /// The pool holds only this step's contributions
    #[default]
    PerStep,

    /// The pool decays by `ρ` and accumulates contributions
    Accumulating,
}

/// Which agents an observer can see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Full,
    LocalGraph,
}

/// Observation variant handed to agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ObservationMode {
    /// Complete post-step state and every agent's realized actions
    #[default]
    Full,

    /// Own wealth plus neighbors from the configured graph
    LocalGraph,

    /// Like `visibility`, but the stock figure carries Gaussian noise
    Noisy {
        #[serde(default)]
        visibility: Visibility,
    },
}

impl ObservationMode {
    /// Returns the underlying visibility, ignoring noise.
    pub fn visibility(&self) -> Visibility {
        match self {
            ObservationMode::Full => Visibility::Full,
            ObservationMode::LocalGraph => Visibility::LocalGraph,
            ObservationMode::Noisy { visibility } => *visibility,
        }
    }
}

/// Directed neighbor relation: agent → agents it can see.
///
/// Agents missing from the map see nobody. Construction of the graph
/// (rings, small worlds, ...) is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborGraph(BTreeMap<AgentId, BTreeSet<AgentId>>);

impl NeighborGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `from` see `to`.
    pub fn add_edge(&mut self, from: AgentId, to: AgentId) {
        self.0.entry(from).or_default().insert(to);
    }

    /// Adds edges in both directions.
    pub fn add_undirected(&mut self, a: AgentId, b: AgentId) {
        self.add_edge(a, b);
        self.add_edge(b, a);
    }

    /// Neighbors of `agent`, ordered by id.
    pub fn neighbors(&self, agent: AgentId) -> impl Iterator<Item = AgentId> + '_ {
        self.0.get(&agent).into_iter().flat_map(|set| set.iter().copied())
    }

    /// Iterates over every `(from, to)` edge.
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId)> + '_ {
        self.0
            .iter()
            .flat_map(|(from, set)| set.iter().map(move |to| (*from, *to)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|set| set.is_empty())
    }
}

impl FromIterator<(AgentId, AgentId)> for NeighborGraph {
    fn from_iter<I: IntoIterator<Item = (AgentId, AgentId)>>(iter: I) -> Self {
        let mut graph = NeighborGraph::new();
        for (from, to) in iter {
            graph.add_edge(from, to);
        }
        graph
    }
}

/// Immutable parameters for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resource capacity `K`
    pub capacity: f64,

    /// Per-agent harvest cap `h_max`
    pub max_harvest: f64,

    /// Regeneration rate `γ`
    pub regen_rate: f64,

    /// Regeneration law, fixed for the run
    pub regeneration: RegenerationLaw,

    /// Whether contributions and the governance pool are active
    pub governance_enabled: bool,

    /// Pool evolution mode
    pub pool_mode: PoolMode,

    /// Pool decay `ρ` (accumulating mode only)
    pub pool_decay: f64,

    /// Bonus coefficient `α`: regeneration bonus per unit of pool
    pub bonus_coefficient: f64,

    /// Discount factor `δ` for return calculations
    pub discount: f64,

    /// Collapse threshold `R_critical`
    pub collapse_threshold: f64,

    /// Consecutive zero-stock steps `k` that count as collapse
    pub zero_streak_limit: u32,

    /// Stop the run on the step that triggers collapse
    pub terminate_on_collapse: bool,

    /// Observation variant
    pub observation: ObservationMode,

    /// Variance `σ_R²` of the stock noise (noisy observation only)
    pub stock_noise_variance: f64,

    /// Neighbor graph for local-graph visibility
    pub neighbors: NeighborGraph,

    /// Horizon `T` in steps
    pub horizon: u32,

    /// Number of agents `n`
    pub num_agents: usize,

    /// Initial stock `R_0`
    pub initial_stock: f64,

    /// Initial wealth of every agent
    pub initial_wealth: f64,

    /// Initial governance pool (ignored when governance is disabled)
    pub initial_pool: f64,

    /// Seed for the run-scoped random source
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: 100.0,
            max_harvest: 10.0,
            regen_rate: 0.05,
            regeneration: RegenerationLaw::Logistic,
            governance_enabled: false,
            pool_mode: PoolMode::PerStep,
            pool_decay: 1.0,
            bonus_coefficient: 0.0,
            discount: 1.0,
            collapse_threshold: 0.0,
            zero_streak_limit: 1,
            terminate_on_collapse: false,
            observation: ObservationMode::Full,
            stock_noise_variance: 0.0,
            neighbors: NeighborGraph::new(),
            horizon: 50,
            num_agents: 6,
            initial_stock: 100.0,
            initial_wealth: 0.0,
            initial_pool: 0.0,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config and validates it.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::invalid(format!("parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every structural constraint on the parameters.
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = [
            ("capacity", self.capacity),
            ("max_harvest", self.max_harvest),
            ("regen_rate", self.regen_rate),
            ("pool_decay", self.pool_decay),
            ("bonus_coefficient", self.bonus_coefficient),
            ("discount", self.discount),
            ("collapse_threshold", self.collapse_threshold),
            ("stock_noise_variance", self.stock_noise_variance),
            ("initial_stock", self.initial_stock),
            ("initial_wealth", self.initial_wealth),
            ("initial_pool", self.initial_pool),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::invalid(format!("{} must be finite, got {}", name, value)));
        }

        if self.capacity <= 0.0 {
            return Err(EngineError::invalid(format!("capacity must be > 0, got {}", self.capacity)));
        }
        if self.max_harvest < 0.0 {
            return Err(EngineError::invalid(format!(
                "max_harvest must be >= 0, got {}",
                self.max_harvest
            )));
        }
        if !(0.0..=1.0).contains(&self.pool_decay) {
            return Err(EngineError::invalid(format!(
                "pool_decay must lie in [0, 1], got {}",
                self.pool_decay
            )));
        }
        if self.bonus_coefficient < 0.0 {
            return Err(EngineError::invalid(format!(
                "bonus_coefficient must be >= 0, got {}",
                self.bonus_coefficient
            )));
        }
        if self.discount <= 0.0 || self.discount > 1.0 {
            return Err(EngineError::invalid(format!(
                "discount must lie in (0, 1], got {}",
                self.discount
            )));
        }
        if self.horizon < 1 {
            return Err(EngineError::invalid("horizon must be >= 1"));
        }
        if self.num_agents < 1 {
            return Err(EngineError::invalid("num_agents must be >= 1"));
        }
        if self.num_agents > u32::MAX as usize {
            return Err(EngineError::invalid("num_agents exceeds the agent id range"));
        }
        if self.zero_streak_limit < 1 {
            return Err(EngineError::invalid("zero_streak_limit must be >= 1"));
        }
        if self.collapse_threshold < 0.0 {
            return Err(EngineError::invalid(format!(
                "collapse_threshold must be >= 0, got {}",
                self.collapse_threshold
            )));
        }
        if self.stock_noise_variance < 0.0 {
            return Err(EngineError::invalid(format!(
                "stock_noise_variance must be >= 0, got {}",
                self.stock_noise_variance
            )));
        }

        if let Some((from, to)) = self
            .neighbors
            .edges()
            .find(|(from, to)| from.index() >= self.num_agents || to.index() >= self.num_agents)
        {
            return Err(EngineError::invalid(format!(
                "neighbor edge {} -> {} references an agent outside 0..{}",
                from, to, self.num_agents
            )));
        }

        if !(0.0..=self.capacity).contains(&self.initial_stock) {
            return Err(EngineError::invalid(format!(
                "initial_stock must lie in [0, {}], got {}",
                self.capacity, self.initial_stock
            )));
        }
        if self.initial_wealth < 0.0 {
            return Err(EngineError::invalid("initial_wealth must be >= 0"));
        }
        if self.initial_pool < 0.0 {
            return Err(EngineError::invalid("initial_pool must be >= 0"));
        }

        Ok(())
    }

    /// Standard deviation of the stock noise.
    pub fn stock_noise_std(&self) -> f64 {
        self.stock_noise_variance.sqrt()
    }
}
