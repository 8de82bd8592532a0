use super::module::{ServiceModule, misrouted};
use crate::db::ResourceCreate;
use crate::error::AgentError;
use crate::registry::RegistryService;
use async_trait::async_trait;
use mlagent_schema::{Call, Method, Reply};

pub struct ResourceModule {
    registry: RegistryService,
}

impl ResourceModule {
    pub fn new(registry: RegistryService) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ServiceModule for ResourceModule {
    fn name(&self) -> &'static str {
        "resource"
    }

    fn methods(&self) -> &'static [Method] {
        Method::RESOURCE
    }

    async fn probe(&self) -> Result<(), AgentError> {
        self.registry.probe().await
    }

    async fn handle(&self, call: Call) -> Result<Reply, AgentError> {
        match call {
            Call::AddResource {
                name,
                path,
                description,
                app_info,
            } => {
                self.registry
                    .add_resource(ResourceCreate {
                        name,
                        path,
                        description,
                        app_info,
                    })
                    .await?;
                Ok(Reply::ok())
            }
            Call::GetResource { name } => {
                let info = self.registry.get_resource(&name).await?;
                Ok(Reply::with_info(info))
            }
            Call::DeleteResource { name } => {
                self.registry.delete_resource(&name).await?;
                Ok(Reply::ok())
            }
            other => Err(misrouted(self.name(), &other)),
        }
    }
}
