//! Gateway server configuration.

use serde::{Deserialize, Serialize};

/// Settings for the tool surface exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported to clients.
    #[serde(default = "default_name")]
    pub name: String,

    /// Whether write-tagged tools are listed.
    ///
    /// Listing is all this controls: write tools refuse every call.
    #[serde(default)]
    pub allow_write: bool,

    /// Tools hidden from this connection.
    #[serde(default)]
    pub exclude_tools: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            allow_write: false,
            exclude_tools: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Check if a tool is excluded by name.
    pub fn is_tool_excluded(&self, name: &str) -> bool {
        self.exclude_tools.iter().any(|t| t == name)
    }
}

fn default_name() -> String {
    "floe".to_string()
}
