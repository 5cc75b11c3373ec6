//! Commons Core - Shared Renewable-Resource Step Engine
//!
//! N agents harvest a shared, regenerating stock and may fund a collective
//! governance pool that boosts regrowth. This crate implements the
//! step-transition function and nothing else:
//!
//! 1. **Validation**: raw actions are repaired into legal bounds, never rejected
//! 2. **Allocation**: scarcity is resolved by proportional rationing
//! 3. **Ledger**: wealth, governance pool and bonus updates
//! 4. **Dynamics**: logistic or linear regrowth, clamped to `[0, K]`
//! 5. **Observation**: full, local-graph or noisy per-agent views
//! 6. **Collapse**: threshold and zero-streak detection, optional termination
//!
//! Decision policies, orchestration and export live outside this crate.
//!
//! # Usage
//!
//! ```ignore
//! use commons_core::{EngineConfig, StepEngine};
//! use commons_env::Action;
//!
//! let mut engine = StepEngine::new(EngineConfig {
//!     num_agents: 2,
//!     ..Default::default()
//! })?;
//!
//! let outcome = engine.step(&[Action::harvest(4.0), Action::harvest(6.0)])?;
//! println!("stock={} rewards={:?}", outcome.state.stock, outcome.rewards);
//! ```

pub mod allocator;
pub mod collapse;
pub mod config;
pub mod dynamics;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod observation;
pub mod state;
pub mod validator;

// Re-export key types for convenience
pub use allocator::{allocate, AllocationOutcome};
pub use collapse::{CollapseCause, CollapseMonitor, CollapseStatus};
pub use config::{EngineConfig, NeighborGraph, ObservationMode, PoolMode, RegenerationLaw, Visibility};
pub use dynamics::ResourceDynamics;
pub use engine::{StepEngine, StepOutcome, StepRecord, Termination};
pub use error::EngineError;
pub use observation::ObservationBuilder;
pub use state::State;
pub use validator::{validate_actions, ClampFlags};
