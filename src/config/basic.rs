use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Which bus the daemon serves.
///
/// `session` is per-user and never leaves the loopback interface; `system` binds the
/// configured `listen_addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    #[default]
    Session,
    System,
}

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Listen address used on the system bus.
    /// TOML: `basic.listen_addr`. Default: `127.0.0.1`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// Listen port.
    /// TOML: `basic.listen_port`. Default: `8190`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// TOML: `basic.bus`. Default: `session`.
    #[serde(default)]
    pub bus: BusKind,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            bus: BusKind::default(),
            loglevel: default_loglevel(),
        }
    }
}

impl BasicConfig {
    /// Socket the transport binds, after applying the bus selection.
    pub fn bind_addr(&self) -> SocketAddr {
        match self.bus {
            BusKind::Session => SocketAddr::from((Ipv4Addr::LOCALHOST, self.listen_port)),
            BusKind::System => SocketAddr::from((self.listen_addr, self.listen_port)),
        }
    }
}

fn default_listen_ip() -> IpAddr {
    Ipv4Addr::LOCALHOST.into()
}

fn default_listen_port() -> u16 {
    8190
}

fn default_loglevel() -> String {
    "info".to_string()
}
