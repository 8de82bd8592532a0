use crate::error::AgentError;
use mlagent_schema::{ModelInfo, ResourceInfo};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbModel {
    pub version: i64,
    pub active: bool,
    pub path: String,
    pub description: String,
    pub app_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbResource {
    pub id: i64,
    pub path: String,
    pub description: String,
    pub app_info: String,
}

/// Payload for registering a new model version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCreate {
    pub name: String,
    pub path: String,
    pub active: bool,
    pub description: String,
    pub app_info: String,
}

/// Payload for adding (or refreshing) one resource file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCreate {
    pub name: String,
    pub path: String,
    pub description: String,
    pub app_info: String,
}

impl TryFrom<DbModel> for ModelInfo {
    type Error = AgentError;

    fn try_from(row: DbModel) -> Result<Self, Self::Error> {
        let version = u32::try_from(row.version).map_err(|_| {
            AgentError::InvalidState(format!("stored model version {} out of range", row.version))
        })?;
        Ok(ModelInfo {
            version,
            active: row.active,
            path: row.path,
            description: row.description,
            app_info: row.app_info,
        })
    }
}

impl From<DbResource> for ResourceInfo {
    fn from(row: DbResource) -> Self {
        ResourceInfo {
            path: row.path,
            description: row.description,
            app_info: row.app_info,
        }
    }
}
