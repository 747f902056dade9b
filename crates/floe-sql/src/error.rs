//! Error types for the SQL crate.

use thiserror::Error;

/// Errors produced while selecting a dialect or handling identifiers.
///
/// Classification itself never fails; see [`crate::WriteDetector::classify`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// Dialect name not recognized.
    #[error("unknown SQL dialect: {0}")]
    UnknownDialect(String),

    /// Identifier was empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// Identifier contains characters outside the allowed set.
    #[error("invalid identifier: {name}")]
    InvalidIdentifier { name: String },

    /// Identifier exceeds the maximum length.
    #[error("identifier is too long ({len} characters)")]
    IdentifierTooLong { len: usize },

    /// Table name is not of the form `database.schema.table`.
    #[error("table name must be fully qualified as 'database.schema.table', got '{name}'")]
    NotQualified { name: String },
}
