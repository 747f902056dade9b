//! Warehouse session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the upstream warehouse session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// SQL dialect used to tokenize statements (e.g. "snowflake", "postgres").
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Seconds after which an authenticated session is refreshed.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,

    /// Connect at startup instead of on the first query.
    #[serde(default)]
    pub eager_connect: bool,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            session_ttl_seconds: default_session_ttl(),
            eager_connect: false,
        }
    }
}

impl WarehouseConfig {
    /// Session lifetime as a `Duration`.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

fn default_dialect() -> String {
    "snowflake".to_string()
}

fn default_session_ttl() -> u64 {
    1800
}
