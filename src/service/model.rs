use super::module::{ServiceModule, misrouted};
use crate::db::{ModelCreate, ModelSelector};
use crate::error::AgentError;
use crate::registry::RegistryService;
use async_trait::async_trait;
use mlagent_schema::{Call, Method, Reply};

pub struct ModelModule {
    registry: RegistryService,
}

impl ModelModule {
    pub fn new(registry: RegistryService) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ServiceModule for ModelModule {
    fn name(&self) -> &'static str {
        "model"
    }

    fn methods(&self) -> &'static [Method] {
        Method::MODEL
    }

    async fn probe(&self) -> Result<(), AgentError> {
        self.registry.probe().await
    }

    async fn handle(&self, call: Call) -> Result<Reply, AgentError> {
        match call {
            Call::RegisterModel {
                name,
                path,
                activate,
                description,
                app_info,
            } => {
                let version = self
                    .registry
                    .register_model(ModelCreate {
                        name,
                        path,
                        active: activate,
                        description,
                        app_info,
                    })
                    .await?;
                Ok(Reply::with_version(version))
            }
            Call::UpdateModelDescription {
                name,
                version,
                description,
            } => {
                self.registry
                    .update_model_description(&name, version, &description)
                    .await?;
                Ok(Reply::ok())
            }
            Call::ActivateModel { name, version } => {
                self.registry.activate_model(&name, version).await?;
                Ok(Reply::ok())
            }
            // Version 0 follows the store's selector and returns every version.
            Call::GetModel { name, version } => {
                let selector = ModelSelector::try_from(i64::from(version))?;
                let info = self.registry.get_model(&name, selector).await?;
                Ok(Reply::with_info(info))
            }
            Call::GetActivatedModel { name } => {
                let info = self.registry.get_model(&name, ModelSelector::Active).await?;
                Ok(Reply::with_info(info))
            }
            Call::GetAllModels { name } => {
                let info = self.registry.get_model(&name, ModelSelector::All).await?;
                Ok(Reply::with_info(info))
            }
            Call::DeleteModel {
                name,
                version,
                force,
            } => {
                self.registry.delete_model(&name, version, force).await?;
                Ok(Reply::ok())
            }
            other => Err(misrouted(self.name(), &other)),
        }
    }
}
