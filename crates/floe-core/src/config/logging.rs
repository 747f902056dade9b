//! Logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log level and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. "info", "floe_mcp=debug").
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for `floe.log`. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
