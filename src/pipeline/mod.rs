//! Pipeline lifecycle: live engine instances launched from stored descriptions.

mod dry_run;
mod engine;
mod id;
mod manager;

pub use dry_run::DryRunEngine;
pub use engine::{EngineError, EngineHandle, PipelineEngine};
pub use id::IdGenerator;
pub use manager::{PipelineInfo, PipelineManager};

use crate::error::AgentError;
use async_trait::async_trait;

/// Where launch reads pipeline descriptions from.
#[async_trait]
pub trait PipelineSource: Send + Sync {
    async fn pipeline_description(&self, name: &str) -> Result<String, AgentError>;
}
