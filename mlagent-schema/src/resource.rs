use serde::{Deserialize, Serialize};

/// One file belonging to a named resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceInfo {
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub app_info: String,
}
