//! Error types for the gateway crate.

use floe_sql::SqlError;
use thiserror::Error;

/// Errors that can occur while serving tools.
#[derive(Debug, Error)]
pub enum McpError {
    /// Tool not found or not visible on this connection.
    #[error("unknown tool: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The read-only channel received a statement classified as a write.
    #[error("write operations are not permitted on this read-only channel (matched: {keyword})")]
    WriteRejected { keyword: String },

    /// A write tool was called.
    #[error("write operations are permanently disabled on this gateway (tool: {tool})")]
    WriteDisabled { tool: String },

    /// Identifier or dialect problem.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// Could not establish a warehouse session.
    #[error("failed to connect to warehouse: {0}")]
    Connection(String),

    /// The warehouse rejected or failed a query.
    #[error("query failed: {0}")]
    Query(String),

    /// Resource not found.
    #[error("unknown resource: {uri}")]
    ResourceNotFound { uri: String },

    /// Invalid gateway configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
