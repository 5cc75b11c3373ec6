//! Common types shared by the engine and its agents.

use serde::{Deserialize, Serialize};

/// Identifier of an agent within a run.
///
/// Agents are numbered `0..n` in the order the engine stores their wealth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Returns the position of this agent in per-agent vectors.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Creates an id from a vector position.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// A raw per-step decision.
///
/// Values are unchecked: negative, oversized or NaN entries are legal here
/// and get repaired by the engine before they touch any state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Requested harvest from the shared stock
    pub harvest: f64,

    /// Offered contribution to the governance pool
    pub contribute: f64,
}

impl Action {
    /// Creates an action.
    pub fn new(harvest: f64, contribute: f64) -> Self {
        Self { harvest, contribute }
    }

    /// Harvest only, no contribution.
    pub fn harvest(amount: f64) -> Self {
        Self::new(amount, 0.0)
    }
}

/// What an agent can see of another agent after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub agent: AgentId,
    pub wealth: f64,
    pub harvest: f64,
    pub contribution: f64,
}

/// A per-agent view of the world, produced fresh after every step.
///
/// Under full observability `peers` lists every agent (the observer
/// included); under local-graph observability it lists only the
/// observer's neighbors, ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The observing agent
    pub agent: AgentId,

    /// Number of completed steps when this observation was taken
    pub step: u32,

    /// Reported stock. Equal to the true stock unless noise is configured.
    pub stock: f64,

    /// Governance pool, `None` when governance is disabled
    pub pool: Option<f64>,

    /// The observer's own wealth
    pub own_wealth: f64,

    /// Visible agents with their wealth and last realized actions
    pub peers: Vec<PeerRecord>,
}

impl Observation {
    /// Returns the ids of all agents visible to the observer.
    pub fn known_agents(&self) -> Vec<AgentId> {
        self.peers.iter().map(|p| p.agent).collect()
    }

    /// Looks up a visible peer.
    pub fn peer(&self, agent: AgentId) -> Option<&PeerRecord> {
        self.peers.iter().find(|p| p.agent == agent)
    }
}
