use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// SQLite database URL.
    /// TOML: `store.database_url`. Default: `sqlite://mlagent.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Namespace prepended to every stored key so the tables can share a file with
    /// unrelated data.
    /// TOML: `store.key_prefix`. Default: `mlagent.`.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://mlagent.db".to_string()
}

fn default_key_prefix() -> String {
    "mlagent.".to_string()
}
