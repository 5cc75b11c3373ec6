//! The decision-making capability injected into a run.

use crate::types::{Action, Observation};

/// Maps an agent's latest observation to its next raw action.
///
/// Implementations are unconstrained: they may keep internal state, return
/// out-of-range values, or ignore the observation entirely. The engine
/// repairs whatever comes back.
///
/// # Implementations
///
/// - **Baselines**: greedy, cooperative and resource-aware rules in `commons_sim`
/// - **Replay**: a scripted policy that plays back a recorded action list
/// - **External**: anything else (learning agents, remote services) lives outside the workspace
pub trait Policy: Send {
    /// Chooses an action given the most recent observation.
    fn decide(&mut self, obs: &Observation) -> Action;

    /// Returns a short label for logs and exports.
    fn name(&self) -> &str;
}
