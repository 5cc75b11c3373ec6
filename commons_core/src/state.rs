//! Mutable simulation state.

use crate::collapse::CollapseStatus;
use crate::config::EngineConfig;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Everything that changes from one step to the next.
///
/// Owned exclusively by the [`StepEngine`](crate::StepEngine). Components
/// read values out of it and hand new values back; none of them keep a
/// reference across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Shared stock `R`, always within `[0, K]`
    pub stock: f64,

    /// Per-agent wealth `w`, always non-negative
    pub wealth: Vec<f64>,

    /// Governance pool `P`, present iff governance is enabled
    pub pool: Option<f64>,

    /// Consecutive steps that ended with zero stock
    pub zero_streak: u32,

    /// Completed steps `t`
    pub step: u32,

    /// Collapse state machine position
    pub collapse: CollapseStatus,

    /// No further steps are accepted
    pub terminated: bool,
}

impl State {
    /// Builds the `t = 0` state from the config's initial values.
    pub fn initial(config: &EngineConfig) -> Self {
        Self {
            stock: config.initial_stock,
            wealth: vec![config.initial_wealth; config.num_agents],
            pool: config.governance_enabled.then_some(config.initial_pool),
            zero_streak: 0,
            step: 0,
            collapse: CollapseStatus::Running,
            terminated: false,
        }
    }

    /// Checks a caller-supplied state against the config.
    pub fn validate(&self, config: &EngineConfig) -> Result<(), EngineError> {
        if self.wealth.len() != config.num_agents {
            return Err(EngineError::invalid(format!(
                "state has {} wealth entries for {} agents",
                self.wealth.len(),
                config.num_agents
            )));
        }
        if !self.stock.is_finite() || self.stock < 0.0 || self.stock > config.capacity {
            return Err(EngineError::invalid(format!(
                "stock {} outside [0, {}]",
                self.stock, config.capacity
            )));
        }
        if let Some(i) = self.wealth.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::invalid(format!(
                "wealth of agent {} is {}",
                i, self.wealth[i]
            )));
        }
        match (config.governance_enabled, self.pool) {
            (true, Some(p)) if p.is_finite() && p >= 0.0 => {}
            (true, Some(p)) => {
                return Err(EngineError::invalid(format!("pool must be >= 0, got {}", p)))
            }
            (true, None) => return Err(EngineError::invalid("governance enabled but state has no pool")),
            (false, Some(_)) => {
                return Err(EngineError::invalid("governance disabled but state carries a pool"))
            }
            (false, None) => {}
        }
        if self.step > config.horizon {
            return Err(EngineError::invalid(format!(
                "step {} beyond horizon {}",
                self.step, config.horizon
            )));
        }
        Ok(())
    }

    /// Pool value with the governance-disabled case read as zero.
    pub fn pool_value(&self) -> f64 {
        self.pool.unwrap_or(0.0)
    }

    pub fn num_agents(&self) -> usize {
        self.wealth.len()
    }
}
