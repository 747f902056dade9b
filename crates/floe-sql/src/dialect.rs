//! SQL dialect selection.
//!
//! The dialect decides how text is split into tokens (comment syntax,
//! quoting rules) and whether `/*! ... */` comments are executed.

use crate::error::SqlError;
use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    AnsiDialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SnowflakeDialect,
};
use sqlparser::tokenizer::{Token, Tokenizer, TokenizerError};
use std::fmt;
use std::str::FromStr;

/// Supported tokenizer dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// Snowflake (`//` line comments, `$$` strings).
    #[default]
    Snowflake,
    /// PostgreSQL.
    Postgres,
    /// MySQL.
    MySql,
    /// ANSI SQL.
    Ansi,
    /// Permissive generic dialect.
    Generic,
}

impl SqlDialect {
    /// Split `sql` into tokens, comments and whitespace included.
    pub fn tokenize(self, sql: &str) -> Result<Vec<Token>, TokenizerError> {
        match self {
            SqlDialect::Snowflake => Tokenizer::new(&SnowflakeDialect {}, sql).tokenize(),
            SqlDialect::Postgres => Tokenizer::new(&PostgreSqlDialect {}, sql).tokenize(),
            SqlDialect::MySql => Tokenizer::new(&MySqlDialect {}, sql).tokenize(),
            SqlDialect::Ansi => Tokenizer::new(&AnsiDialect {}, sql).tokenize(),
            SqlDialect::Generic => Tokenizer::new(&GenericDialect {}, sql).tokenize(),
        }
    }

    /// Whether the server runs the body of `/*! ... */` comments as SQL.
    ///
    /// The generic dialect is included since it may front a MySQL server.
    pub fn executes_bang_comments(self) -> bool {
        matches!(self, SqlDialect::MySql | SqlDialect::Generic)
    }

    /// Canonical lowercase name, as accepted in configuration.
    pub fn name(self) -> &'static str {
        match self {
            SqlDialect::Snowflake => "snowflake",
            SqlDialect::Postgres => "postgres",
            SqlDialect::MySql => "mysql",
            SqlDialect::Ansi => "ansi",
            SqlDialect::Generic => "generic",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlDialect {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowflake" => Ok(SqlDialect::Snowflake),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            "mysql" => Ok(SqlDialect::MySql),
            "ansi" => Ok(SqlDialect::Ansi),
            "generic" => Ok(SqlDialect::Generic),
            other => Err(SqlError::UnknownDialect(other.to_string())),
        }
    }
}
