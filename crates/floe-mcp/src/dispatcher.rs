//! The read-only query channel.
//!
//! Every statement the gateway sends to the warehouse passes through
//! [`ReadOnlyDispatcher::execute`], which classifies it first and refuses
//! anything that could write.

use crate::error::McpError;
use crate::session::SessionManager;
use crate::warehouse::{Connector, QueryOutput, Warehouse};
use floe_sql::WriteDetector;
use std::sync::Arc;

pub struct ReadOnlyDispatcher<C: Connector> {
    detector: WriteDetector,
    sessions: Arc<SessionManager<C>>,
}

impl<C: Connector> ReadOnlyDispatcher<C> {
    pub fn new(detector: WriteDetector, sessions: Arc<SessionManager<C>>) -> Self {
        Self { detector, sessions }
    }

    pub fn detector(&self) -> &WriteDetector {
        &self.detector
    }

    pub fn sessions(&self) -> &Arc<SessionManager<C>> {
        &self.sessions
    }

    /// Classify `sql` and run it only if it is read-only.
    ///
    /// A rejected statement never reaches the warehouse and does not open a
    /// session.
    pub async fn execute(&self, sql: &str) -> Result<QueryOutput, McpError> {
        let detection = self.detector.classify(sql);

        if detection.contains_write {
            let keyword = detection
                .matched_keyword
                .clone()
                .unwrap_or_else(|| detection.statement_type.to_string());
            tracing::warn!(
                keyword = %keyword,
                statement_type = %detection.statement_type,
                "Rejected write on read-only channel"
            );
            return Err(McpError::WriteRejected { keyword });
        }

        let session = self.sessions.acquire().await?;

        tracing::debug!(statement_type = %detection.statement_type, "Executing read-only query");

        let rows = session
            .query(sql)
            .await
            .map_err(|e| McpError::Query(format!("{e:#}")))?;

        let output = QueryOutput::new(rows);
        tracing::debug!(data_id = %output.data_id, rows = output.rows.len(), "Query complete");
        Ok(output)
    }
}
