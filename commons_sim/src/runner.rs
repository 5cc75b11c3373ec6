//! Scenario runner - drives one engine run with a population of policies.
//!
//! Each round is a barrier: every policy decides from the previous
//! observations before the engine applies the whole action vector.

use crate::error::SimError;
use crate::policies::ScriptedPolicy;
use crate::scenarios::ScenarioId;

use commons_core::{CollapseStatus, EngineConfig, StepEngine, StepRecord, Termination};
use commons_env::{Action, Policy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of leading series entries kept in a summary.
const SERIES_HEAD: usize = 10;

/// Headline numbers for one finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub collapsed: bool,

    /// Step at which collapse triggered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_step: Option<u32>,

    /// Why the run stopped, `None` if it never reached a terminal step
    pub termination: Option<Termination>,

    /// Steps executed
    pub steps: u32,

    pub final_stock: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_pool: Option<f64>,

    pub final_wealth: Vec<f64>,

    /// `Σ_t δ^t r_i^t` per agent
    pub discounted_returns: Vec<f64>,

    /// Stock after each of the first steps
    pub stock_series_head: Vec<f64>,

    /// Pool after each of the first steps
    pub pool_series_head: Vec<f64>,
}

impl RunSummary {
    fn from_engine(engine: &StepEngine, termination: Option<Termination>) -> Self {
        let state = engine.state();
        let mut stock_series = engine.stock_series();
        stock_series.truncate(SERIES_HEAD);
        let mut pool_series = engine.pool_series();
        pool_series.truncate(SERIES_HEAD);

        Self {
            collapsed: state.collapse == CollapseStatus::Collapsed,
            collapse_step: engine.collapse_step(),
            termination,
            steps: state.step,
            final_stock: state.stock,
            final_pool: state.pool,
            final_wealth: state.wealth.clone(),
            discounted_returns: engine.discounted_returns(),
            stock_series_head: stock_series,
            pool_series_head: pool_series,
        }
    }
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Configuration the engine ran with
    pub config: EngineConfig,

    /// One record per executed step
    pub records: Vec<StepRecord>,

    pub summary: RunSummary,
}

/// Runs baseline scenarios against a base configuration.
pub struct ScenarioRunner {
    /// Base engine configuration
    config: EngineConfig,

    /// Run seed, replaces `config.seed`
    seed: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Sets the number of rounds (the horizon `T`).
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.config.horizon = rounds;
        self
    }

    /// Sets the number of agents.
    pub fn with_agents(mut self, num_agents: usize) -> Self {
        self.config.num_agents = num_agents;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a scenario to termination and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        let policies = scenario.build_policies(&self.run_config());
        self.drive(scenario, policies)
    }

    /// Replays the validated actions of recorded steps, one script per agent.
    ///
    /// With the same configuration and seed the replay reproduces the
    /// recorded stock, pool and wealth trajectory.
    pub fn replay(&self, scenario: ScenarioId, records: &[StepRecord]) -> Result<ScenarioResult, SimError> {
        info!("Replaying {} steps of {} (seed={})", records.len(), scenario.name(), self.seed);

        let policies = (0..self.config.num_agents)
            .map(|i| {
                let script = records
                    .iter()
                    .map(|r| {
                        Action::new(
                            r.requested.get(i).copied().unwrap_or_default(),
                            r.contributions.get(i).copied().unwrap_or_default(),
                        )
                    })
                    .collect();
                Box::new(ScriptedPolicy::new(script)) as Box<dyn Policy>
            })
            .collect();
        self.drive(scenario, policies)
    }

    fn run_config(&self) -> EngineConfig {
        EngineConfig {
            seed: self.seed,
            ..self.config.clone()
        }
    }

    fn drive(
        &self,
        scenario: ScenarioId,
        mut policies: Vec<Box<dyn Policy>>,
    ) -> Result<ScenarioResult, SimError> {
        let config = self.run_config();
        let mut engine = StepEngine::new(config.clone())?;

        let mut observations = engine.initial_observations();
        let mut termination = None;

        while !engine.is_terminated() {
            let actions: Vec<Action> = policies
                .iter_mut()
                .zip(&observations)
                .map(|(policy, obs)| policy.decide(obs))
                .collect();

            let outcome = engine.step(&actions)?;
            observations = outcome.observations;
            termination = outcome.termination;
        }

        let summary = RunSummary::from_engine(&engine, termination);
        debug!("  {} steps | final stock={:.3}", summary.steps, summary.final_stock);
        info!(
            "Finished scenario: {} (seed={}) collapsed={} stock={:.3}",
            scenario.name(),
            self.seed,
            summary.collapsed,
            summary.final_stock
        );

        Ok(ScenarioResult {
            scenario,
            seed: self.seed,
            config,
            records: engine.history().to_vec(),
            summary,
        })
    }
}

/// First step whose stock, pool or wealth differs between two runs.
///
/// A run that is shorter than the other diverges at its length.
pub fn first_divergence(expected: &[StepRecord], actual: &[StepRecord]) -> Option<u32> {
    let mismatch = expected.iter().zip(actual).find(|(e, a)| {
        e.stock_after != a.stock_after || e.pool_after != a.pool_after || e.wealth != a.wealth
    });
    match mismatch {
        Some((e, _)) => Some(e.step),
        None if expected.len() != actual.len() => {
            Some(expected.len().min(actual.len()) as u32)
        }
        None => None,
    }
}
