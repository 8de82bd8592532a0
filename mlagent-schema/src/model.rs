use serde::{Deserialize, Serialize};

/// One registered model version as returned by the model interface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelInfo {
    pub version: u32,
    pub active: bool,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub app_info: String,
}
