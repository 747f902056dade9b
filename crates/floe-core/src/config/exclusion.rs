//! Exclusion patterns for introspection results.
//!
//! Patterns are case-insensitive substrings: `temp` hides `TEMP_LOAD` and
//! `analytics_temp` alike.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of object an exclusion pattern applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionKind {
    Database,
    Schema,
    Table,
}

impl fmt::Display for ExclusionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionKind::Database => write!(f, "databases"),
            ExclusionKind::Schema => write!(f, "schemas"),
            ExclusionKind::Table => write!(f, "tables"),
        }
    }
}

/// Patterns hiding databases, schemas and tables from listing tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionConfig {
    #[serde(default)]
    pub databases: Vec<String>,

    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(default)]
    pub tables: Vec<String>,
}

impl ExclusionConfig {
    /// Patterns for one kind of object.
    pub fn patterns(&self, kind: ExclusionKind) -> &[String] {
        match kind {
            ExclusionKind::Database => &self.databases,
            ExclusionKind::Schema => &self.schemas,
            ExclusionKind::Table => &self.tables,
        }
    }

    /// Check if `name` matches any pattern of the given kind.
    pub fn is_excluded(&self, kind: ExclusionKind, name: &str) -> bool {
        let name = name.to_lowercase();
        self.patterns(kind)
            .iter()
            .any(|pattern| name.contains(&pattern.to_lowercase()))
    }

    /// Append the patterns of `other`, skipping duplicates.
    pub fn merge(&mut self, other: ExclusionConfig) {
        extend_unique(&mut self.databases, other.databases);
        extend_unique(&mut self.schemas, other.schemas);
        extend_unique(&mut self.tables, other.tables);
    }

    /// Total number of patterns.
    pub fn len(&self) -> usize {
        self.databases.len() + self.schemas.len() + self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_substring_match() {
        let config = ExclusionConfig {
            databases: vec!["temp".to_string()],
            schemas: vec![],
            tables: vec!["Backup".to_string()],
        };

        assert!(config.is_excluded(ExclusionKind::Database, "ANALYTICS_TEMP"));
        assert!(!config.is_excluded(ExclusionKind::Database, "ANALYTICS"));
        assert!(config.is_excluded(ExclusionKind::Table, "users_backup_2024"));
        assert!(!config.is_excluded(ExclusionKind::Schema, "temp"));
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut config = ExclusionConfig {
            databases: vec!["temp".to_string()],
            ..Default::default()
        };
        config.merge(ExclusionConfig {
            databases: vec!["temp".to_string(), "scratch".to_string()],
            schemas: vec!["staging".to_string()],
            tables: vec![],
        });

        assert_eq!(config.databases, vec!["temp", "scratch"]);
        assert_eq!(config.schemas, vec!["staging"]);
        assert_eq!(config.len(), 3);
    }
}
