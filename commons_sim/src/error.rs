//! Harness error type.

use commons_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("replay diverged at step {step}")]
    ReplayDiverged { step: u32 },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}
