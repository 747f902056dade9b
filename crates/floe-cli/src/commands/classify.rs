//! `floe classify` - classify SQL without executing it.

use anyhow::{Context, Result};
use floe_sql::{DetectionResult, SqlDialect, WriteDetector};
use std::io::Read;
use std::path::PathBuf;

/// Classify and print. Returns whether the text contains a write.
pub fn run(sql: Option<String>, file: Option<PathBuf>, dialect: &str, json: bool) -> Result<bool> {
    let dialect: SqlDialect = dialect.parse()?;
    let sql = read_sql(sql, file)?;

    let result = WriteDetector::with_dialect(dialect).classify(&sql);
    tracing::debug!(
        dialect = %dialect,
        contains_write = result.contains_write,
        statements = result.statements.len(),
        "Classified SQL"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render(&result));
    }

    Ok(result.contains_write)
}

fn read_sql(sql: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(sql) = sql {
        return Ok(sql);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read SQL file: {:?}", path));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read SQL from stdin")?;
    Ok(buf)
}

fn render(result: &DetectionResult) -> String {
    let mut out = String::new();

    if result.contains_write {
        let keyword = result
            .matched_keyword
            .clone()
            .unwrap_or_else(|| result.statement_type.to_string());
        out.push_str(&format!(
            "WRITE ({}) matched: {}\n",
            result.statement_type, keyword
        ));
    } else {
        out.push_str(&format!("READ ({})\n", result.statement_type));
    }

    for (idx, segment) in result.statements.iter().enumerate() {
        let verdict = if segment.contains_write { "write" } else { "read" };
        out.push_str(&format!(
            "   {}. {} [{}]\n",
            idx + 1,
            segment.statement_type,
            verdict
        ));
    }

    out
}
