//! Wealth and governance-pool bookkeeping.

use crate::config::{EngineConfig, PoolMode};
use serde::{Deserialize, Serialize};

/// Applies `w_i' = w_i + h̃_i - c_i` to every agent.
///
/// Non-negative as long as `c_i <= w_i` and `h̃_i >= 0`, which validation
/// guarantees: `w_i + h̃_i` rounds to at least `w_i`, so subtracting `c_i`
/// cannot go below zero.
pub fn apply_wealth(wealth: &[f64], realized: &[f64], contributions: &[f64]) -> Vec<f64> {
    wealth
        .iter()
        .zip(realized)
        .zip(contributions)
        .map(|((w, h), c)| w + h - c)
        .collect()
}

/// Per-step reward `r_i = h̃_i - c_i`. The governance bonus goes to the
/// stock, not to individual rewards.
pub fn rewards(realized: &[f64], contributions: &[f64]) -> Vec<f64> {
    realized.iter().zip(contributions).map(|(h, c)| h - c).collect()
}

/// Pool values produced by one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernanceOutcome {
    /// `C = Σc_i`
    pub total_contribution: f64,

    /// `P'`
    pub pool: f64,

    /// `G = α·P'`
    pub bonus: f64,
}

/// Pool rules taken from the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Governance {
    pub mode: PoolMode,
    pub decay: f64,
    pub bonus_coefficient: f64,
}

impl Governance {
    /// Returns the pool rules, or `None` when governance is disabled.
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        config.governance_enabled.then(|| Self {
            mode: config.pool_mode,
            decay: config.pool_decay,
            bonus_coefficient: config.bonus_coefficient,
        })
    }

    /// `P' = C` (per-step) or `P' = ρ·P + C` (accumulating).
    pub fn update_pool(&self, pool: f64, total_contribution: f64) -> f64 {
        match self.mode {
            PoolMode::PerStep => total_contribution,
            PoolMode::Accumulating => self.decay * pool + total_contribution,
        }
    }

    /// `G = α·P'`, computed from the pool *after* this step's update.
    pub fn bonus(&self, updated_pool: f64) -> f64 {
        self.bonus_coefficient * updated_pool
    }

    /// Runs the pool update and bonus for one step.
    pub fn settle(&self, pool: f64, contributions: &[f64]) -> GovernanceOutcome {
        let total_contribution: f64 = contributions.iter().sum();
        let updated = self.update_pool(pool, total_contribution);
        GovernanceOutcome {
            total_contribution,
            pool: updated,
            bonus: self.bonus(updated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn governance(mode: PoolMode, decay: f64, alpha: f64) -> Governance {
        Governance { mode, decay, bonus_coefficient: alpha }
    }

    #[test]
    fn test_wealth_update() {
        let w = apply_wealth(&[10.0, 10.0], &[25.0, 0.0], &[3.0, 10.0]);
        assert_eq!(w, vec![32.0, 0.0]);
    }

    #[test]
    fn test_full_contribution_leaves_exactly_zero() {
        let w = apply_wealth(&[0.1 + 0.2], &[0.0], &[0.1 + 0.2]);
        assert_eq!(w, vec![0.0]);
    }

    #[test]
    fn test_rewards_exclude_bonus() {
        assert_eq!(rewards(&[5.0, 2.0], &[1.0, 2.0]), vec![4.0, 0.0]);
    }

    #[test]
    fn test_per_step_pool_does_not_carry_over() {
        let g = governance(PoolMode::PerStep, 0.9, 0.0);
        let out = g.settle(100.0, &[3.0, 2.0]);
        assert_eq!(out.total_contribution, 5.0);
        assert_eq!(out.pool, 5.0);
    }

    #[test]
    fn test_accumulating_pool_decays_and_adds() {
        let g = governance(PoolMode::Accumulating, 0.5, 0.0);
        assert_relative_eq!(g.update_pool(10.0, 2.0), 7.0);
    }

    #[test]
    fn test_accumulating_full_memory_without_contributions() {
        let g = governance(PoolMode::Accumulating, 1.0, 0.0);
        let mut pool = 8.0;
        for _ in 0..10 {
            pool = g.update_pool(pool, 0.0);
        }
        assert_eq!(pool, 8.0);
    }

    #[test]
    fn test_accumulating_zero_decay_matches_per_step() {
        let acc = governance(PoolMode::Accumulating, 0.0, 0.0);
        let per = governance(PoolMode::PerStep, 0.0, 0.0);
        assert_eq!(acc.update_pool(42.0, 3.0), per.update_pool(42.0, 3.0));
    }

    #[test]
    fn test_bonus_uses_updated_pool() {
        let g = governance(PoolMode::Accumulating, 0.5, 0.2);
        let out = g.settle(10.0, &[1.0, 1.0]);
        // P' = 0.5·10 + 2 = 7, G = 0.2·7
        assert_relative_eq!(out.pool, 7.0);
        assert_relative_eq!(out.bonus, 1.4);
    }

    #[test]
    fn test_disabled_governance_has_no_rules() {
        let config = EngineConfig::default();
        assert!(Governance::from_config(&config).is_none());

        let config = EngineConfig {
            governance_enabled: true,
            pool_mode: PoolMode::Accumulating,
            pool_decay: 0.3,
            bonus_coefficient: 0.1,
            ..Default::default()
        };
        assert_eq!(
            Governance::from_config(&config),
            Some(governance(PoolMode::Accumulating, 0.3, 0.1))
        );
    }
}
