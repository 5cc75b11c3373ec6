//! StepEngine - orchestrates one decision step.
//!
//! # Step order
//!
//! ```text
//! For each step t:
//!  1. Receive raw actions for all agents
//!  2. Validate / clamp
//!  3. Allocate harvest (proportional rationing)
//!  4. Update wealth
//!  5. Update governance pool
//!  6. Compute governance bonus from the updated pool
//!  7. Update stock
//!  8. Compute rewards
//!  9. Build observations
//! 10. Check collapse / termination
//! ```
//!
//! The order is fixed. In particular the bonus of step 6 feeds the stock
//! update of step 7 in the same step.
//!
//! All values are computed into locals and committed to [`State`] in one
//! assignment at the end, so a caller never sees a half-applied step.

use crate::allocator::allocate;
use crate::collapse::{CollapseCause, CollapseMonitor, CollapseStatus};
use crate::config::EngineConfig;
use crate::dynamics::ResourceDynamics;
use crate::error::EngineError;
use crate::ledger::{apply_wealth, rewards, Governance};
use crate::observation::{builder_for, ObservationBuilder, StepView};
use crate::state::State;
use crate::validator::{validate_actions, ClampFlags};

use commons_env::{Action, AgentId, Observation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Why a run stopped accepting steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Collapse with terminate-on-collapse enabled
    Collapsed,

    /// `t` reached the horizon `T`
    HorizonReached,
}

/// Everything that happened in one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Zero-based index of the executed step
    pub step: u32,

    pub stock_before: f64,

    /// `R - H`, before regrowth and bonus
    pub stock_after_harvest: f64,

    pub stock_after: f64,

    pub pool_before: Option<f64>,
    pub pool_after: Option<f64>,

    /// `C = Σc_i`
    pub total_contribution: f64,

    /// `G`
    pub bonus: f64,

    /// Rationing factor `φ`
    pub scale: f64,

    /// `H`
    pub total_harvest: f64,

    /// Validated harvest requests
    pub requested: Vec<f64>,

    /// Realized harvests
    pub realized: Vec<f64>,

    /// Validated contributions
    pub contributions: Vec<f64>,

    pub rewards: Vec<f64>,

    /// Wealth after the step
    pub wealth: Vec<f64>,

    pub clamped: Vec<ClampFlags>,

    pub collapse: CollapseStatus,

    /// Set on the step that triggered collapse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_cause: Option<CollapseCause>,
}

/// Output of a single step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// State after the step
    pub state: State,

    /// Per-agent rewards `r_i = h̃_i - c_i`
    pub rewards: Vec<f64>,

    /// One observation per agent, in index order
    pub observations: Vec<Observation>,

    /// `Some` if this was the last step of the run
    pub termination: Option<Termination>,

    pub record: StepRecord,
}

/// The step engine. Owns the run's [`State`] exclusively.
pub struct StepEngine {
    config: EngineConfig,
    state: State,
    governance: Option<Governance>,
    dynamics: ResourceDynamics,
    monitor: CollapseMonitor,
    observer: Box<dyn ObservationBuilder>,
    history: Vec<StepRecord>,
}

impl std::fmt::Debug for StepEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEngine")
            .field("state", &self.state)
            .field("observer", &self.observer.name())
            .field("steps", &self.history.len())
            .finish()
    }
}

impl StepEngine {
    /// Creates an engine starting from the config's initial values.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let state = State::initial(&config);
        Self::build(config, state)
    }

    /// Creates an engine starting from a caller-supplied state.
    pub fn with_state(config: EngineConfig, state: State) -> Result<Self, EngineError> {
        config.validate()?;
        state.validate(&config)?;
        Self::build(config, state)
    }

    fn build(config: EngineConfig, mut state: State) -> Result<Self, EngineError> {
        let observer = builder_for(&config)?;

        if state.step >= config.horizon
            || (state.collapse == CollapseStatus::Collapsed && config.terminate_on_collapse)
        {
            state.terminated = true;
        }

        debug!(
            "Engine ready: n={} K={} law={:?} observation={} governance={}",
            config.num_agents,
            config.capacity,
            config.regeneration,
            observer.name(),
            config.governance_enabled
        );

        Ok(Self {
            governance: Governance::from_config(&config),
            dynamics: ResourceDynamics::from_config(&config),
            monitor: CollapseMonitor::from_config(&config),
            observer,
            config,
            state,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Records of every step executed so far.
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn is_terminated(&self) -> bool {
        self.state.terminated
    }

    /// Observations of the current state with no realized actions.
    ///
    /// Gives policies something to act on before the first step. Under
    /// noisy observation this draws from the run's RNG like any other
    /// observation.
    pub fn initial_observations(&mut self) -> Vec<Observation> {
        let zeros = vec![0.0; self.state.num_agents()];
        let view = StepView {
            step: self.state.step,
            stock: self.state.stock,
            pool: self.state.pool,
            wealth: &self.state.wealth,
            harvests: &zeros,
            contributions: &zeros,
        };
        self.observer.observe_all(&view)
    }

    /// Executes one step with the full batch of raw actions.
    ///
    /// `actions[i]` belongs to agent `i`. Out-of-range, non-finite, missing
    /// or surplus actions are repaired, never rejected.
    pub fn step(&mut self, actions: &[Action]) -> Result<StepOutcome, EngineError> {
        if self.state.terminated {
            return Err(EngineError::RunTerminated { step: self.state.step });
        }

        let t = self.state.step;
        let stock = self.state.stock;

        // 2. validate
        let validated = validate_actions(
            actions,
            &self.state.wealth,
            self.config.max_harvest,
            self.config.governance_enabled,
        );
        if validated.missing > 0 || validated.surplus > 0 {
            warn!(
                "step {}: got {} actions for {} agents ({} missing, {} dropped)",
                t,
                actions.len(),
                self.state.num_agents(),
                validated.missing,
                validated.surplus
            );
        }

        // 3. allocate
        let allocation = allocate(&validated.harvests, stock);

        // 4. wealth
        let wealth = apply_wealth(&self.state.wealth, &allocation.realized, &validated.contributions);

        // 5-6. pool and bonus
        let (pool, total_contribution, bonus) = match &self.governance {
            Some(governance) => {
                let outcome = governance.settle(self.state.pool_value(), &validated.contributions);
                (Some(outcome.pool), outcome.total_contribution, outcome.bonus)
            }
            None => (None, 0.0, 0.0),
        };

        // 7. stock
        let update = self.dynamics.next_stock(stock, allocation.total, bonus);

        // 8. rewards
        let step_rewards = rewards(&allocation.realized, &validated.contributions);

        // 9. observations
        let next_step = t + 1;
        let observations = self.observer.observe_all(&StepView {
            step: next_step,
            stock: update.next,
            pool,
            wealth: &wealth,
            harvests: &allocation.realized,
            contributions: &validated.contributions,
        });

        // 10. collapse / termination
        let assessment = self.monitor.assess(update.next, self.state.zero_streak, self.state.collapse);
        if let Some(cause) = assessment.triggered {
            info!("Collapse at step {}: {:?} (stock={:.4})", t, cause, update.next);
        }

        let termination = if assessment.status == CollapseStatus::Collapsed
            && self.config.terminate_on_collapse
        {
            Some(Termination::Collapsed)
        } else if next_step >= self.config.horizon {
            Some(Termination::HorizonReached)
        } else {
            None
        };

        let record = StepRecord {
            step: t,
            stock_before: stock,
            stock_after_harvest: update.after_harvest,
            stock_after: update.next,
            pool_before: self.state.pool,
            pool_after: pool,
            total_contribution,
            bonus,
            scale: allocation.scale,
            total_harvest: allocation.total,
            requested: validated.harvests,
            realized: allocation.realized,
            contributions: validated.contributions,
            rewards: step_rewards.clone(),
            wealth: wealth.clone(),
            clamped: validated.clamped,
            collapse: assessment.status,
            collapse_cause: assessment.triggered,
        };

        debug!(
            "step {}: R {:.4} -> {:.4} | H={:.4} phi={:.4} | P={:?} G={:.4}",
            t, stock, update.next, allocation.total, allocation.scale, pool, bonus
        );

        // Commit
        self.state = State {
            stock: update.next,
            wealth,
            pool,
            zero_streak: assessment.zero_streak,
            step: next_step,
            collapse: assessment.status,
            terminated: termination.is_some(),
        };
        self.history.push(record.clone());

        if let Some(reason) = termination {
            info!("Run terminated after step {}: {:?}", t, reason);
        }

        Ok(StepOutcome {
            state: self.state.clone(),
            rewards: step_rewards,
            observations,
            termination,
            record,
        })
    }

    /// Reward sequence of one agent, one entry per executed step.
    pub fn rewards(&self, agent: AgentId) -> Vec<f64> {
        self.history
            .iter()
            .filter_map(|r| r.rewards.get(agent.index()).copied())
            .collect()
    }

    /// `Σ_t δ^t r_i^t` for every agent over the executed steps.
    pub fn discounted_returns(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.config.num_agents];
        for record in &self.history {
            let weight = match i32::try_from(record.step) {
                Ok(t) => self.config.discount.powi(t),
                Err(_) => self.config.discount.powf(f64::from(record.step)),
            };
            for (total, r) in totals.iter_mut().zip(&record.rewards) {
                *total += weight * r;
            }
        }
        totals
    }

    /// Step at which collapse first triggered in this engine's history.
    pub fn collapse_step(&self) -> Option<u32> {
        self.history
            .iter()
            .find(|r| r.collapse_cause.is_some())
            .map(|r| r.step)
    }

    /// Stock after each executed step.
    pub fn stock_series(&self) -> Vec<f64> {
        self.history.iter().map(|r| r.stock_after).collect()
    }

    /// Pool after each executed step (zero when governance is disabled).
    pub fn pool_series(&self) -> Vec<f64> {
        self.history.iter().map(|r| r.pool_after.unwrap_or(0.0)).collect()
    }
}
