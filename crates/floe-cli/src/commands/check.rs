//! `floe check` command implementation.
//!
//! Loads `floe.yaml` (plus its exclusions file) and reports:
//! - Load and validation errors
//! - Settings the gateway cannot use (unknown dialect, unknown tool names)
//! - Notes on the resulting tool surface

use anyhow::Result;
use floe_core::{ExclusionKind, FloeConfig};
use floe_mcp::ToolKind;
use floe_sql::SqlDialect;
use std::path::Path;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    pub category: String,
    pub message: String,
}

impl CheckFinding {
    fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
        }
    }

    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }
}

/// Inspect a loaded configuration.
pub fn check_config(config: &FloeConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    if let Err(e) = config.warehouse.dialect.parse::<SqlDialect>() {
        findings.push(CheckFinding::error("warehouse", e.to_string()));
    }

    for name in &config.server.exclude_tools {
        if ToolKind::from_name(name).is_none() {
            findings.push(CheckFinding::warning(
                "server",
                format!("exclude_tools names unknown tool '{name}'"),
            ));
        }
    }

    if config.server.allow_write {
        findings.push(CheckFinding::warning(
            "server",
            "allow_write lists write tools, but every call to them is refused",
        ));
    }

    for kind in [
        ExclusionKind::Database,
        ExclusionKind::Schema,
        ExclusionKind::Table,
    ] {
        let patterns = config.exclude_patterns.patterns(kind);
        if patterns.iter().any(|p| p.trim().is_empty()) {
            findings.push(CheckFinding::warning(
                "exclusions",
                format!("empty pattern in {kind} hides every entry"),
            ));
        }
        if !patterns.is_empty() {
            findings.push(CheckFinding::info(
                "exclusions",
                format!("{} {kind} pattern(s)", patterns.len()),
            ));
        }
    }

    findings.push(CheckFinding::info(
        "warehouse",
        format!(
            "dialect {}, session TTL {}s, eager connect {}",
            config.warehouse.dialect,
            config.warehouse.session_ttl_seconds,
            config.warehouse.eager_connect
        ),
    ));

    findings
}

/// Run the check and print findings. Returns false on any error.
pub fn run(config_path: &Path) -> Result<bool> {
    println!("🔍 Checking {}", config_path.display());

    let findings = match FloeConfig::load(config_path) {
        Ok(config) => check_config(&config),
        Err(e) => vec![CheckFinding::error("config", e.to_string())],
    };

    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let group: Vec<_> = findings.iter().filter(|f| f.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!("\n{} ({}):", heading(severity), group.len());
        for finding in group {
            println!("  [{}] {}", finding.category, finding.message);
        }
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors == 0 {
        println!("\n✅ Configuration is valid");
    } else {
        println!("\n❌ {errors} error(s) found");
    }

    Ok(errors == 0)
}

fn heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌ Errors",
        Severity::Warning => "⚠️  Warnings",
        Severity::Info => "ℹ️  Info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severities(yaml: &str) -> Vec<(Severity, String)> {
        let config = FloeConfig::from_yaml(yaml).unwrap();
        check_config(&config)
            .into_iter()
            .map(|f| (f.severity, f.message))
            .collect()
    }

    #[test]
    fn test_default_config_has_no_problems() {
        assert!(severities("{}").iter().all(|(s, _)| *s == Severity::Info));
    }

    #[test]
    fn test_unknown_dialect_is_error() {
        let found = severities("warehouse:\n  dialect: oracle\n");
        assert!(found.iter().any(|(s, m)| *s == Severity::Error && m.contains("oracle")));
    }

    #[test]
    fn test_unknown_excluded_tool_is_warning() {
        let found = severities("server:\n  exclude_tools: [query_codebase, read_query]\n");
        let warnings: Vec<_> = found
            .iter()
            .filter(|(s, _)| *s == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].1.contains("query_codebase"));
    }

    #[test]
    fn test_allow_write_is_flagged() {
        let found = severities("server:\n  allow_write: true\n");
        assert!(found
            .iter()
            .any(|(s, m)| *s == Severity::Warning && m.contains("refused")));
    }

    #[test]
    fn test_run_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!run(&dir.path().join("absent.yaml")).unwrap());
    }

    #[test]
    fn test_run_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floe.yaml");
        std::fs::write(&path, "exclude_patterns:\n  databases: [temp]\n").unwrap();
        assert!(run(&path).unwrap());
    }
}
