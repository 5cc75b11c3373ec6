//! Baseline rule-based policies.
//!
//! These are reference behaviours for exercising the engine, not agent
//! intelligence. Each maps an observation to an action with a fixed rule.

use commons_env::{Action, AgentId, Observation, Policy};

/// Always asks for the maximum harvest and never contributes.
#[derive(Debug, Clone)]
pub struct GreedyHarvester {
    pub agent: AgentId,
    pub max_harvest: f64,
}

impl GreedyHarvester {
    pub fn new(agent: AgentId, max_harvest: f64) -> Self {
        Self { agent, max_harvest }
    }
}

impl Policy for GreedyHarvester {
    fn decide(&mut self, _obs: &Observation) -> Action {
        Action::harvest(self.max_harvest)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

/// Harvests a share of the per-capita stock and contributes a fraction of wealth.
#[derive(Debug, Clone)]
pub struct CooperativeHarvester {
    pub agent: AgentId,
    pub max_harvest: f64,

    /// Fraction of the per-capita stock to take
    pub target_share: f64,

    /// Fraction of own wealth offered to the pool
    pub contribution_rate: f64,
}

impl CooperativeHarvester {
    pub fn new(agent: AgentId, max_harvest: f64) -> Self {
        Self {
            agent,
            max_harvest,
            target_share: 0.5,
            contribution_rate: 0.05,
        }
    }
}

impl Policy for CooperativeHarvester {
    fn decide(&mut self, obs: &Observation) -> Action {
        let visible = obs.peers.len().max(1) as f64;
        let target = self.target_share * obs.stock / visible;
        let harvest = target.max(0.0).min(self.max_harvest);
        let contribute = (self.contribution_rate * obs.own_wealth).max(0.0);
        Action::new(harvest, contribute)
    }

    fn name(&self) -> &str {
        "cooperative"
    }
}

/// Scales harvest and contribution with the stock's fill level.
///
/// Below `low_fraction` of capacity it harvests little and contributes
/// more; above `high_fraction` the reverse. In between both rates are
/// interpolated linearly.
#[derive(Debug, Clone)]
pub struct ResourceAwareHarvester {
    pub agent: AgentId,
    pub max_harvest: f64,

    /// Capacity used to compute the fill level, or the observed stock if unset
    pub capacity: Option<f64>,

    pub low_fraction: f64,
    pub high_fraction: f64,
    pub harvest_low: f64,
    pub harvest_high: f64,
    pub contribution_low: f64,
    pub contribution_high: f64,
}

impl ResourceAwareHarvester {
    pub fn new(agent: AgentId, max_harvest: f64, capacity: Option<f64>) -> Self {
        Self {
            agent,
            max_harvest,
            capacity,
            low_fraction: 0.25,
            high_fraction: 0.75,
            harvest_low: 0.25,
            harvest_high: 0.9,
            contribution_low: 0.10,
            contribution_high: 0.02,
        }
    }

    /// Harvest fraction and contribution rate for a fill level.
    fn rates(&self, fill: f64) -> (f64, f64) {
        if fill <= self.low_fraction {
            (self.harvest_low, self.contribution_low)
        } else if fill >= self.high_fraction {
            (self.harvest_high, self.contribution_high)
        } else {
            let span = self.high_fraction - self.low_fraction;
            let alpha = if span <= 0.0 { 0.0 } else { (fill - self.low_fraction) / span };
            (
                self.harvest_low + alpha * (self.harvest_high - self.harvest_low),
                self.contribution_low + alpha * (self.contribution_high - self.contribution_low),
            )
        }
    }
}

impl Policy for ResourceAwareHarvester {
    fn decide(&mut self, obs: &Observation) -> Action {
        let capacity = self.capacity.unwrap_or_else(|| obs.stock.max(1.0));
        let fill = if capacity > 0.0 { obs.stock / capacity } else { 0.0 };
        let (harvest_fraction, contribution_rate) = self.rates(fill);

        Action::new(
            (harvest_fraction * self.max_harvest).max(0.0),
            (contribution_rate * obs.own_wealth).max(0.0),
        )
    }

    fn name(&self) -> &str {
        "resource_aware"
    }
}

/// Plays back a fixed action list, then idles.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    actions: Vec<Action>,
    cursor: usize,
}

impl ScriptedPolicy {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, cursor: 0 }
    }
}

impl Policy for ScriptedPolicy {
    fn decide(&mut self, _obs: &Observation) -> Action {
        let action = self.actions.get(self.cursor).copied().unwrap_or_default();
        self.cursor += 1;
        action
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
