//! Commons Environment Boundary
//!
//! This crate holds the types that cross the line between the Commons
//! step engine and the agents that play against it:
//!
//! - **Actions** flow *in*: one raw `(harvest, contribute)` pair per agent per step
//! - **Observations** flow *out*: one immutable snapshot per agent per step
//! - **Policies** close the loop: anything that maps an observation to an action
//!
//! The engine never calls a policy itself. A harness gathers every agent's
//! action for a step first, then hands the whole batch to the engine.
//!
//! # Example
//!
//! ```ignore
//! use commons_env::{Action, Observation, Policy};
//!
//! struct Constant(f64);
//!
//! impl Policy for Constant {
//!     fn decide(&mut self, _obs: &Observation) -> Action {
//!         Action::harvest(self.0)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "constant"
//!     }
//! }
//! ```

mod policy;
mod types;

pub use policy::Policy;
pub use types::{Action, AgentId, Observation, PeerRecord};
