//! Contract with the pipeline engine.
//!
//! Every method may block; callers run them on blocking threads.

use mlagent_schema::{PipelineState, errno};
use std::time::Duration;
use thiserror::Error as ThisError;

use crate::error::ResultCode;

#[derive(Debug, ThisError)]
pub enum EngineError {
    #[error("Failed to parse pipeline description: {0}")]
    Parse(String),

    #[error("Engine refused transition to {target}: {reason}")]
    StateChange {
        target: PipelineState,
        reason: String,
    },

    #[error("Engine did not settle in time")]
    Timeout,

    #[error("Engine call panicked: {0}")]
    Panicked(String),
}

impl ResultCode for EngineError {
    fn result_code(&self) -> i32 {
        match self {
            EngineError::Parse(_) | EngineError::StateChange { .. } | EngineError::Panicked(_) => {
                errno::ESTRPIPE
            }
            EngineError::Timeout => errno::ETIMEDOUT,
        }
    }
}

/// Builds engine instances from textual descriptions.
pub trait PipelineEngine: Send + Sync {
    fn parse(&self, description: &str) -> Result<Box<dyn EngineHandle>, EngineError>;
}

/// One constructed engine instance. Dropping it releases the engine's resources.
pub trait EngineHandle: Send {
    /// Requests `target`. Requesting the current state is a no-op.
    fn set_state(&mut self, target: PipelineState) -> Result<(), EngineError>;

    /// Current state, waiting at most `timeout` for a pending transition to settle.
    fn state(&self, timeout: Duration) -> Result<PipelineState, EngineError>;

    /// Brings the instance to `Null` ahead of release. May hang for some element types;
    /// callers bound it.
    fn shutdown(&mut self) -> Result<(), EngineError>;
}
