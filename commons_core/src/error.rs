//! Error types for the Commons engine.

use thiserror::Error;

/// Errors surfaced by the step engine.
///
/// Malformed agent actions are never errors; they are repaired during
/// validation. Only setup problems and misuse of a finished run fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A configuration or initial state is structurally invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `step` was called after the run terminated
    #[error("Run terminated after step {step}; no further steps accepted")]
    RunTerminated { step: u32 },
}

impl EngineError {
    /// Creates a configuration error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
