use super::module::{ServiceModule, misrouted};
use crate::error::AgentError;
use crate::pipeline::PipelineManager;
use crate::registry::RegistryService;
use async_trait::async_trait;
use mlagent_schema::{Call, Method, Reply};
use std::sync::Arc;

/// Pipeline descriptions (stored) and pipeline instances (live).
pub struct PipelineModule {
    registry: RegistryService,
    manager: Arc<PipelineManager>,
}

impl PipelineModule {
    pub fn new(registry: RegistryService, manager: Arc<PipelineManager>) -> Self {
        Self { registry, manager }
    }
}

#[async_trait]
impl ServiceModule for PipelineModule {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn methods(&self) -> &'static [Method] {
        Method::PIPELINE
    }

    async fn probe(&self) -> Result<(), AgentError> {
        self.registry.probe().await
    }

    async fn exit(&self) {
        self.manager.shutdown().await;
    }

    async fn handle(&self, call: Call) -> Result<Reply, AgentError> {
        match call {
            Call::SetPipeline { name, description } => {
                self.registry.set_pipeline(&name, &description).await?;
                Ok(Reply::ok())
            }
            Call::GetPipeline { name } => {
                let description = self.registry.get_pipeline(&name).await?;
                Ok(Reply::with_description(description))
            }
            Call::DeletePipeline { name } => {
                self.registry.delete_pipeline(&name).await?;
                Ok(Reply::ok())
            }
            Call::LaunchPipeline { name } => {
                let id = self.manager.launch(&name).await?;
                Ok(Reply::with_id(id))
            }
            Call::StartPipeline { id } => {
                self.manager.start(id).await?;
                Ok(Reply::ok())
            }
            Call::StopPipeline { id } => {
                self.manager.stop(id).await?;
                Ok(Reply::ok())
            }
            Call::DestroyPipeline { id } => {
                self.manager.destroy(id).await?;
                Ok(Reply::ok())
            }
            Call::GetState { id } => {
                let state = self.manager.get_state(id).await?;
                Ok(Reply::with_state(state))
            }
            other => Err(misrouted(self.name(), &other)),
        }
    }
}
