//! Registry service: the validated, transport-shaped face of the service database.
//!
//! Every method is one message to the database actor, which brackets it with its own
//! connect/disconnect. Model and resource lookups come back as JSON text ready for a reply.

use crate::db::store::{require, require_version};
use crate::db::{DbActorHandle, ModelCreate, ModelSelector, ResourceCreate};
use crate::error::AgentError;
use crate::pipeline::PipelineSource;
use crate::utils::logging::with_pretty_json_debug;
use async_trait::async_trait;
use mlagent_schema::{ModelInfo, ResourceInfo};
use tracing::{debug, info};

#[derive(Clone)]
pub struct RegistryService {
    db: DbActorHandle,
}

impl RegistryService {
    pub fn new(db: DbActorHandle) -> Self {
        Self { db }
    }

    pub async fn probe(&self) -> Result<(), AgentError> {
        self.db.probe().await
    }

    pub async fn set_pipeline(&self, name: &str, description: &str) -> Result<(), AgentError> {
        require(name, "pipeline name")?;
        require(description, "pipeline description")?;
        self.db
            .set_pipeline(name.to_string(), description.to_string())
            .await?;
        info!(name, "pipeline description set");
        Ok(())
    }

    pub async fn get_pipeline(&self, name: &str) -> Result<String, AgentError> {
        require(name, "pipeline name")?;
        self.db.get_pipeline(name.to_string()).await
    }

    pub async fn delete_pipeline(&self, name: &str) -> Result<(), AgentError> {
        require(name, "pipeline name")?;
        self.db.delete_pipeline(name.to_string()).await?;
        info!(name, "pipeline description deleted");
        Ok(())
    }

    /// Registers a new model version; returns the version the store assigned.
    pub async fn register_model(&self, create: ModelCreate) -> Result<u32, AgentError> {
        require(&create.name, "model name")?;
        require(&create.path, "model path")?;
        let name = create.name.clone();
        let active = create.active;
        let version = self.db.register_model(create).await?;
        info!(name = %name, version, active, "model registered");
        Ok(version)
    }

    pub async fn update_model_description(
        &self,
        name: &str,
        version: u32,
        description: &str,
    ) -> Result<(), AgentError> {
        require(name, "model name")?;
        require(description, "model description")?;
        require_version(version)?;
        self.db
            .update_model_description(name.to_string(), version, description.to_string())
            .await
    }

    pub async fn activate_model(&self, name: &str, version: u32) -> Result<(), AgentError> {
        require(name, "model name")?;
        require_version(version)?;
        self.db.activate_model(name.to_string(), version).await?;
        info!(name, version, "model activated");
        Ok(())
    }

    /// JSON for the selected model rows: an array for [`ModelSelector::All`], otherwise the
    /// single object.
    pub async fn get_model(&self, name: &str, selector: ModelSelector) -> Result<String, AgentError> {
        require(name, "model name")?;
        let rows = self.db.get_model(name.to_string(), selector).await?;
        let mut infos = rows
            .into_iter()
            .map(ModelInfo::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let log_reply = |pretty: &str| debug!(name, ?selector, "model lookup reply: {pretty}");
        match selector {
            ModelSelector::All => {
                with_pretty_json_debug(&infos, log_reply);
                Ok(serde_json::to_string(&infos)?)
            }
            ModelSelector::Active | ModelSelector::Version(_) => {
                let info = infos
                    .pop()
                    .ok_or_else(|| AgentError::not_found(format!("no model named {name}")))?;
                with_pretty_json_debug(&info, log_reply);
                Ok(serde_json::to_string(&info)?)
            }
        }
    }

    pub async fn delete_model(&self, name: &str, version: u32, force: bool) -> Result<(), AgentError> {
        require(name, "model name")?;
        self.db.delete_model(name.to_string(), version, force).await?;
        info!(name, version, force, "model deleted");
        Ok(())
    }

    pub async fn add_resource(&self, create: ResourceCreate) -> Result<(), AgentError> {
        require(&create.name, "resource name")?;
        require(&create.path, "resource path")?;
        let name = create.name.clone();
        self.db.set_resource(create).await?;
        info!(name = %name, "resource file added");
        Ok(())
    }

    /// JSON array of the resource's files, oldest first.
    pub async fn get_resource(&self, name: &str) -> Result<String, AgentError> {
        require(name, "resource name")?;
        let rows = self.db.get_resource(name.to_string()).await?;
        let infos: Vec<ResourceInfo> = rows.into_iter().map(ResourceInfo::from).collect();
        with_pretty_json_debug(&infos, |pretty| {
            debug!(name, "resource lookup reply: {pretty}");
        });
        Ok(serde_json::to_string(&infos)?)
    }

    pub async fn delete_resource(&self, name: &str) -> Result<(), AgentError> {
        require(name, "resource name")?;
        self.db.delete_resource(name.to_string()).await?;
        info!(name, "resource deleted");
        Ok(())
    }
}

#[async_trait]
impl PipelineSource for RegistryService {
    async fn pipeline_description(&self, name: &str) -> Result<String, AgentError> {
        self.get_pipeline(name).await
    }
}
