//! Commons Simulation Harness
//!
//! Drives the step engine with populations of rule-based policies:
//!
//! ```text
//!   observations(t) ──► Policy #0 ─┐
//!                  ──► Policy #1 ─┼─► [Action; n] ──► StepEngine::step ──► observations(t+1)
//!                  ──► ...       ─┘
//! ```
//!
//! - **Seeds**: every run is fully determined by its configuration and seed
//! - **Scenarios**: greedy, cooperative, adaptive and mixed populations
//! - **Export**: full run history as JSON, replayable through scripted policies
//!
//! # Usage
//!
//! ```ignore
//! use commons_sim::{ScenarioRunner, scenarios::ScenarioId};
//! use commons_core::EngineConfig;
//!
//! let runner = ScenarioRunner::new(EngineConfig::default(), 42).with_rounds(50);
//! let result = runner.run(ScenarioId::Mixed)?;
//! println!("collapsed={}", result.summary.collapsed);
//! ```

mod error;
mod exporter;
mod runner;
mod seeds;
pub mod policies;
pub mod scenarios;

pub use error::SimError;
pub use exporter::RunExport;
pub use runner::{first_divergence, RunSummary, ScenarioResult, ScenarioRunner};
pub use seeds::SeedProvider;
