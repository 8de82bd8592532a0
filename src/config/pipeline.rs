use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Upper bound for `GetState` to wait on the engine.
    /// TOML: `pipeline.state_timeout_ms`. Default: `10`.
    #[serde(default = "default_state_timeout_ms")]
    pub state_timeout_ms: u64,

    /// Upper bound for graceful engine teardown on destroy. Past it the handle is
    /// released in the background.
    /// TOML: `pipeline.teardown_timeout_ms`. Default: `3000`.
    #[serde(default = "default_teardown_timeout_ms")]
    pub teardown_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            state_timeout_ms: default_state_timeout_ms(),
            teardown_timeout_ms: default_teardown_timeout_ms(),
        }
    }
}

impl PipelineConfig {
    pub fn state_timeout(&self) -> Duration {
        Duration::from_millis(self.state_timeout_ms)
    }

    pub fn teardown_timeout(&self) -> Duration {
        Duration::from_millis(self.teardown_timeout_ms)
    }
}

fn default_state_timeout_ms() -> u64 {
    10
}

fn default_teardown_timeout_ms() -> u64 {
    3000
}
