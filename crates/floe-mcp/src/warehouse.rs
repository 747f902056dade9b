//! Warehouse abstraction.
//!
//! The gateway never talks to a driver directly. A [`Connector`] opens
//! sessions, a [`Warehouse`] session runs statements and returns rows as
//! JSON objects keyed by column name.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// One result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Rows returned by the read-only channel, tagged with a fresh identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutput {
    pub data_id: Uuid,
    pub rows: Vec<Row>,
}

impl QueryOutput {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            data_id: Uuid::new_v4(),
            rows,
        }
    }
}

/// A live warehouse session.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute one SQL text and collect its rows.
    async fn query(&self, sql: &str) -> anyhow::Result<Vec<Row>>;

    /// Release the session.
    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Opens warehouse sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Warehouse + 'static;

    async fn connect(&self) -> anyhow::Result<Self::Session>;
}
