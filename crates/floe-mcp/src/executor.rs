//! Tool execution engine.
//!
//! This module maps tool calls to warehouse work:
//! - Building `INFORMATION_SCHEMA` queries from validated identifiers
//! - Filtering listing results through exclusion patterns
//! - Running user queries on the read-only channel
//! - Recording insights and notifying resource subscribers
//!
//! Every statement, generated or user supplied, goes through
//! [`ReadOnlyDispatcher::execute`].

use crate::catalog::ToolKind;
use crate::dispatcher::ReadOnlyDispatcher;
use crate::error::McpError;
use crate::insights::{InsightLog, INSIGHTS_MEMO_URI};
use crate::protocol::{EmbeddedResource, ToolContent};
use crate::warehouse::{Connector, QueryOutput, Row};
use floe_core::{ExclusionConfig, ExclusionKind};
use floe_sql::{normalize_identifier, quote_literal, QualifiedTable};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Runs built-in tools against the warehouse.
pub struct ToolExecutor<C: Connector> {
    dispatcher: Arc<ReadOnlyDispatcher<C>>,
    exclusions: ExclusionConfig,
    insights: Arc<InsightLog>,
    resource_updates: broadcast::Sender<String>,
}

impl<C: Connector> ToolExecutor<C> {
    pub fn new(
        dispatcher: Arc<ReadOnlyDispatcher<C>>,
        exclusions: ExclusionConfig,
        insights: Arc<InsightLog>,
        resource_updates: broadcast::Sender<String>,
    ) -> Self {
        Self {
            dispatcher,
            exclusions,
            insights,
            resource_updates,
        }
    }

    /// Execute a tool with already schema-validated arguments.
    pub async fn execute(&self, kind: ToolKind, args: &Value) -> Result<Vec<ToolContent>, McpError> {
        match kind {
            ToolKind::HealthCheck => self.health_check().await,
            ToolKind::ListDatabases => self.list_databases().await,
            ToolKind::ListSchemas => {
                let database = required_str(kind, args, "database")?;
                self.list_schemas(database).await
            }
            ToolKind::ListTables => {
                let database = required_str(kind, args, "database")?;
                let schema = required_str(kind, args, "schema")?;
                self.list_tables(database, schema).await
            }
            ToolKind::DescribeTable => {
                let table_name = required_str(kind, args, "table_name")?;
                self.describe_table(table_name).await
            }
            ToolKind::ReadQuery => {
                let query = required_str(kind, args, "query")?;
                self.read_query(query).await
            }
            ToolKind::AppendInsight => {
                let insight = required_str(kind, args, "insight")?;
                self.append_insight(insight)
            }
            ToolKind::WriteQuery | ToolKind::CreateTable => Err(refuse_write(kind)),
        }
    }

    async fn health_check(&self) -> Result<Vec<ToolContent>, McpError> {
        let active = self.dispatcher.sessions().is_active().await;
        Ok(vec![ToolContent::Text {
            text: format!("Server is running. Session active: {active}"),
        }])
    }

    async fn list_databases(&self) -> Result<Vec<ToolContent>, McpError> {
        let output = self
            .dispatcher
            .execute("SELECT DATABASE_NAME FROM INFORMATION_SCHEMA.DATABASES")
            .await?;

        let rows = self.filter_rows(output.rows, ExclusionKind::Database, "DATABASE_NAME");
        Ok(data_content(output.data_id, rows, json!({})))
    }

    async fn list_schemas(&self, database: &str) -> Result<Vec<ToolContent>, McpError> {
        let database = normalize_identifier(database)?;
        let sql = format!("SELECT SCHEMA_NAME FROM {database}.INFORMATION_SCHEMA.SCHEMATA");

        let output = self.dispatcher.execute(&sql).await?;
        let rows = self.filter_rows(output.rows, ExclusionKind::Schema, "SCHEMA_NAME");
        Ok(data_content(
            output.data_id,
            rows,
            json!({ "database": database }),
        ))
    }

    async fn list_tables(&self, database: &str, schema: &str) -> Result<Vec<ToolContent>, McpError> {
        let database = normalize_identifier(database)?;
        let schema = normalize_identifier(schema)?;
        let sql = format!(
            "SELECT TABLE_CATALOG, TABLE_SCHEMA, TABLE_NAME, COMMENT \
             FROM {database}.INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = {}",
            quote_literal(&schema)
        );

        let output = self.dispatcher.execute(&sql).await?;
        let rows = self.filter_rows(output.rows, ExclusionKind::Table, "TABLE_NAME");
        Ok(data_content(
            output.data_id,
            rows,
            json!({ "database": database, "schema": schema }),
        ))
    }

    async fn describe_table(&self, table_name: &str) -> Result<Vec<ToolContent>, McpError> {
        let table = QualifiedTable::parse(table_name)?;
        let sql = format!(
            "SELECT COLUMN_NAME, COLUMN_DEFAULT, IS_NULLABLE, DATA_TYPE, COMMENT \
             FROM {}.INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {}",
            table.database,
            quote_literal(&table.schema),
            quote_literal(&table.table)
        );

        let QueryOutput { data_id, rows } = self.dispatcher.execute(&sql).await?;
        Ok(data_content(
            data_id,
            rows,
            json!({
                "database": table.database,
                "schema": table.schema,
                "table": table.table,
            }),
        ))
    }

    async fn read_query(&self, query: &str) -> Result<Vec<ToolContent>, McpError> {
        let QueryOutput { data_id, rows } = self.dispatcher.execute(query).await?;
        Ok(data_content(data_id, rows, json!({})))
    }

    fn append_insight(&self, insight: &str) -> Result<Vec<ToolContent>, McpError> {
        self.insights.append(insight);
        tracing::info!(total = self.insights.len(), "Insight appended");

        // No subscribers is not an error.
        let _ = self.resource_updates.send(INSIGHTS_MEMO_URI.to_string());

        Ok(vec![ToolContent::Text {
            text: "Insight added to memo".to_string(),
        }])
    }

    fn filter_rows(&self, rows: Vec<Row>, kind: ExclusionKind, column: &str) -> Vec<Row> {
        if self.exclusions.patterns(kind).is_empty() {
            return rows;
        }

        let before = rows.len();
        let kept: Vec<Row> = rows
            .into_iter()
            .filter(|row| {
                column_str(row, column)
                    .is_none_or(|name| !self.exclusions.is_excluded(kind, name))
            })
            .collect();

        if kept.len() != before {
            tracing::debug!(
                kind = %kind,
                hidden = before - kept.len(),
                "Applied exclusion patterns"
            );
        }
        kept
    }
}

/// The single lockout for write tools. Detector output never reaches here:
/// these tools are refused whatever their SQL says.
fn refuse_write(kind: ToolKind) -> McpError {
    tracing::warn!(tool = kind.name(), "Refused call to disabled write tool");
    McpError::WriteDisabled {
        tool: kind.name().to_string(),
    }
}

fn required_str<'a>(kind: ToolKind, args: &'a Value, key: &str) -> Result<&'a str, McpError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| McpError::InvalidArguments {
            tool: kind.name().to_string(),
            reason: format!("missing string argument '{key}'"),
        })
}

/// Look up a column value, ignoring the case of the column name.
fn column_str<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)
        .or_else(|| {
            row.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(column))
                .map(|(_, v)| v)
        })
        .and_then(Value::as_str)
}

/// URI under which a result set is addressable.
pub fn data_uri(data_id: &uuid::Uuid) -> String {
    format!("data://{data_id}")
}

/// The result payload, plus the same payload embedded as a `data://` resource.
fn data_content(data_id: uuid::Uuid, rows: Vec<Row>, extra: Value) -> Vec<ToolContent> {
    let mut payload = json!({
        "type": "data",
        "data_id": data_id.to_string(),
        "data": rows,
    });
    if let (Some(target), Value::Object(extra)) = (payload.as_object_mut(), extra) {
        target.extend(extra);
    }

    let resource = EmbeddedResource {
        uri: data_uri(&data_id),
        mime_type: "application/json".to_string(),
        text: payload.to_string(),
    };

    vec![
        ToolContent::Json { json: payload },
        ToolContent::Resource { resource },
    ]
}
