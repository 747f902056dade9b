//! Identifier validation for generated introspection SQL.
//!
//! Tool arguments such as database or schema names are interpolated into
//! `information_schema` queries. Only plain unquoted identifiers are accepted.

use crate::error::SqlError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const MAX_IDENTIFIER_LEN: usize = 255;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern"));

/// Check that `name` is a plain identifier and return it unchanged.
pub fn validate_identifier(name: &str) -> Result<&str, SqlError> {
    if name.is_empty() {
        return Err(SqlError::EmptyIdentifier);
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(SqlError::IdentifierTooLong { len: name.len() });
    }
    if !IDENTIFIER.is_match(name) {
        return Err(SqlError::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    Ok(name)
}

/// Validate and upper-case an identifier (the warehouse folds unquoted names).
pub fn normalize_identifier(name: &str) -> Result<String, SqlError> {
    validate_identifier(name.trim()).map(str::to_ascii_uppercase)
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A `database.schema.table` name with every part validated and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedTable {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl QualifiedTable {
    /// Parse a fully qualified table name.
    pub fn parse(name: &str) -> Result<Self, SqlError> {
        let parts: Vec<&str> = name.split('.').collect();
        match parts.as_slice() {
            [database, schema, table] => Ok(Self {
                database: normalize_identifier(database)?,
                schema: normalize_identifier(schema)?,
                table: normalize_identifier(table)?,
            }),
            _ => Err(SqlError::NotQualified {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert_eq!(validate_identifier("analytics_prod").unwrap(), "analytics_prod");
        assert_eq!(validate_identifier("_raw$1").unwrap(), "_raw$1");
        assert_eq!(validate_identifier(""), Err(SqlError::EmptyIdentifier));
        assert!(matches!(
            validate_identifier("1abc"),
            Err(SqlError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            validate_identifier("x; DROP TABLE y"),
            Err(SqlError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            validate_identifier(&"a".repeat(300)),
            Err(SqlError::IdentifierTooLong { len: 300 })
        ));
    }

    #[test]
    fn test_normalize_identifier_uppercases() {
        assert_eq!(normalize_identifier(" analytics ").unwrap(), "ANALYTICS");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("PUBLIC"), "'PUBLIC'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }

    #[test]
    fn test_parse_qualified_table() {
        let table = QualifiedTable::parse("analytics.gen.live_video_stats").unwrap();
        assert_eq!(table.database, "ANALYTICS");
        assert_eq!(table.schema, "GEN");
        assert_eq!(table.table, "LIVE_VIDEO_STATS");
        assert_eq!(table.to_string(), "ANALYTICS.GEN.LIVE_VIDEO_STATS");
    }

    #[test]
    fn test_parse_qualified_table_rejects_partial_names() {
        assert!(matches!(
            QualifiedTable::parse("gen.users"),
            Err(SqlError::NotQualified { .. })
        ));
        assert!(matches!(
            QualifiedTable::parse("a.b.c.d"),
            Err(SqlError::NotQualified { .. })
        ));
        assert!(matches!(
            QualifiedTable::parse("a.b.c'--"),
            Err(SqlError::InvalidIdentifier { .. })
        ));
    }
}
