mod basic;
mod pipeline;
mod store;

pub use basic::{BasicConfig, BusKind};
pub use pipeline::PipelineConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Daemon-level settings (see `basic` table in mlagent.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Service database settings (see `store` table in mlagent.toml).
    #[serde(default)]
    pub store: StoreConfig,

    /// Pipeline lifecycle settings (see `pipeline` table in mlagent.toml).
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

const DEFAULT_CONFIG_FILE: &str = "mlagent.toml";
const ENV_PREFIX: &str = "MLAGENT_";

impl Config {
    /// Builds a Figment that merges defaults, `mlagent.toml` if present, and `MLAGENT_*`
    /// environment variables (`MLAGENT_STORE__DATABASE_URL` sets `store.database_url`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from all layers.
    ///
    /// Panics when a present layer cannot be extracted; a daemon with a half-read
    /// configuration must not start.
    pub fn load() -> Self {
        Self::figment()
            .extract()
            .unwrap_or_else(|err| panic!("failed to extract configuration: {err}"))
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_an_empty_figment() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .extract()
            .unwrap();
        assert_eq!(cfg.basic.listen_port, 8190);
        assert_eq!(cfg.basic.bus, BusKind::Session);
        assert_eq!(cfg.store.key_prefix, "mlagent.");
        assert_eq!(cfg.pipeline.state_timeout().as_millis(), 10);
    }

    #[test]
    fn toml_overrides_nested_tables() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [basic]
                bus = "system"

                [store]
                database_url = "sqlite::memory:"
                key_prefix = ""

                [pipeline]
                teardown_timeout_ms = 50
                "#,
            ))
            .extract()
            .unwrap();
        assert_eq!(cfg.basic.bus, BusKind::System);
        assert_eq!(cfg.store.database_url, "sqlite::memory:");
        assert!(cfg.store.key_prefix.is_empty());
        assert_eq!(cfg.pipeline.teardown_timeout().as_millis(), 50);
    }
}
