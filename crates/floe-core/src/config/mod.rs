//! Configuration types for the Floe gateway.
//!
//! Configuration is loaded from a YAML file (`floe.yaml`). Exclusion
//! patterns can be kept inline or in a separate file referenced by
//! `exclusions_file`; both sources are merged.
//!
//! ```yaml
//! server:
//!   allow_write: false
//!   exclude_tools: [create_table]
//! warehouse:
//!   dialect: snowflake
//!   session_ttl_seconds: 1800
//! exclude_patterns:
//!   databases: [temp]
//!   tables: [backup]
//! logging:
//!   level: info
//! ```

pub mod exclusion;
pub mod logging;
pub mod server;
pub mod warehouse;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use exclusion::{ExclusionConfig, ExclusionKind};
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use warehouse::WarehouseConfig;

/// Complete Floe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloeConfig {
    /// Tool surface settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Warehouse session settings.
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Inline exclusion patterns.
    #[serde(default)]
    pub exclude_patterns: ExclusionConfig,

    /// Path to an additional exclusion patterns file (YAML).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions_file: Option<PathBuf>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl FloeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration, merge the exclusions file if any, and validate.
    ///
    /// A relative `exclusions_file` is resolved against the directory of the
    /// main configuration file. A referenced file that does not exist is an
    /// error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(file) = &config.exclusions_file {
            let exclusions_path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };

            let content = fs::read_to_string(&exclusions_path)?;
            let extra: ExclusionConfig = serde_yaml::from_str(&content)?;
            config.exclude_patterns.merge(extra);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.trim().is_empty() {
            return Err(ConfigError::Invalid("server.name must not be empty".into()));
        }
        if self.warehouse.session_ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "warehouse.session_ttl_seconds must be greater than zero".into(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = FloeConfig::from_yaml("{}").unwrap();
        assert_eq!(config.server.name, "floe");
        assert!(!config.server.allow_write);
        assert_eq!(config.warehouse.dialect, "snowflake");
        assert_eq!(config.warehouse.session_ttl_seconds, 1800);
        assert_eq!(config.logging.level, "info");
        assert!(config.exclude_patterns.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
server:
  name: analytics
  allow_write: true
  exclude_tools: [create_table, write_query]
warehouse:
  dialect: postgres
  session_ttl_seconds: 60
  eager_connect: true
exclude_patterns:
  databases: [temp]
  tables: [backup]
logging:
  level: debug
  dir: /var/log/floe
"#;
        let config = FloeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.name, "analytics");
        assert!(config.server.is_tool_excluded("write_query"));
        assert!(!config.server.is_tool_excluded("read_query"));
        assert_eq!(config.warehouse.session_ttl().as_secs(), 60);
        assert!(config.warehouse.eager_connect);
        assert_eq!(config.exclude_patterns.databases, vec!["temp"]);
        assert!(config.exclude_patterns.schemas.is_empty());
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/floe")));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = FloeConfig::from_yaml("warehouse:\n  session_ttl_seconds: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_merges_exclusions_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut extra = fs::File::create(dir.path().join("exclusions.yaml")).unwrap();
        writeln!(extra, "databases: [scratch, temp]\nschemas: [staging]").unwrap();

        let main_path = dir.path().join("floe.yaml");
        fs::write(
            &main_path,
            "exclusions_file: exclusions.yaml\nexclude_patterns:\n  databases: [temp]\n",
        )
        .unwrap();

        let config = FloeConfig::load(&main_path).unwrap();
        assert_eq!(config.exclude_patterns.databases, vec!["temp", "scratch"]);
        assert_eq!(config.exclude_patterns.schemas, vec!["staging"]);
    }

    #[test]
    fn test_load_missing_exclusions_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let main_path = dir.path().join("floe.yaml");
        fs::write(&main_path, "exclusions_file: missing.yaml\n").unwrap();

        assert!(matches!(FloeConfig::load(&main_path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        assert!(matches!(
            FloeConfig::from_yaml("server: [not, a, map]"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
