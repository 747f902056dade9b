//! The gateway: tool listing, tool calls and resources over one warehouse
//! connection.

use crate::catalog::ToolRegistry;
use crate::dispatcher::ReadOnlyDispatcher;
use crate::error::McpError;
use crate::executor::ToolExecutor;
use crate::insights::{InsightLog, INSIGHTS_MEMO_URI};
use crate::protocol::{CallToolResult, ResourceDefinition, ToolDefinition};
use crate::session::SessionManager;
use crate::warehouse::Connector;
use floe_core::{FloeConfig, ServerConfig};
use floe_sql::{SqlDialect, WriteDetector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

const RESOURCE_UPDATE_CAPACITY: usize = 16;

pub struct Gateway<C: Connector> {
    server: ServerConfig,
    eager_connect: bool,
    registry: ToolRegistry,
    validators: HashMap<String, jsonschema::Validator>,
    sessions: Arc<SessionManager<C>>,
    executor: ToolExecutor<C>,
    insights: Arc<InsightLog>,
    resource_updates: broadcast::Sender<String>,
}

impl<C: Connector> Gateway<C> {
    /// Build a gateway from configuration. No connection is made yet.
    pub fn new(config: &FloeConfig, connector: C) -> Result<Self, McpError> {
        let dialect: SqlDialect = config
            .warehouse
            .dialect
            .parse()
            .map_err(|e: floe_sql::SqlError| McpError::Config(e.to_string()))?;

        let registry = ToolRegistry::for_server(&config.server);

        let mut validators = HashMap::new();
        for tool in registry.list() {
            let validator = jsonschema::draft202012::options()
                .build(&tool.input_schema)
                .map_err(|e| {
                    McpError::Config(format!("invalid input schema for {}: {e}", tool.name))
                })?;
            validators.insert(tool.name.clone(), validator);
        }

        let sessions = Arc::new(SessionManager::new(
            connector,
            config.warehouse.session_ttl(),
        ));
        let dispatcher = Arc::new(ReadOnlyDispatcher::new(
            WriteDetector::with_dialect(dialect),
            sessions.clone(),
        ));
        let insights = Arc::new(InsightLog::new());
        let (resource_updates, _) = broadcast::channel(RESOURCE_UPDATE_CAPACITY);

        let executor = ToolExecutor::new(
            dispatcher,
            config.exclude_patterns.clone(),
            insights.clone(),
            resource_updates.clone(),
        );

        tracing::info!(
            name = %config.server.name,
            dialect = %dialect,
            tools = registry.len(),
            allow_write = config.server.allow_write,
            "Gateway configured"
        );

        Ok(Self {
            server: config.server.clone(),
            eager_connect: config.warehouse.eager_connect,
            registry,
            validators,
            sessions,
            executor,
            insights,
            resource_updates,
        })
    }

    /// Connect eagerly when configured to.
    pub async fn start(&self) -> Result<(), McpError> {
        if self.eager_connect {
            self.sessions.warm_up().await?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.server.name
    }

    /// Visible tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.list().cloned().collect()
    }

    /// Call a tool. Failures come back as error results, never as `Err`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> CallToolResult {
        if self.server.is_tool_excluded(name) {
            tracing::info!(tool = %name, "Call to excluded tool");
            return CallToolResult::text(format!(
                "Tool {name} is excluded from this data connection"
            ));
        }

        match self.dispatch(name, arguments).await {
            Ok(content) => CallToolResult::success(content),
            Err(e) => {
                tracing::error!(tool = %name, error = %e, "Tool call failed");
                CallToolResult::error(format!("Error: {e}"))
            }
        }
    }

    async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Vec<crate::protocol::ToolContent>, McpError> {
        let kind = self
            .registry
            .resolve(name)
            .ok_or_else(|| McpError::ToolNotFound {
                name: name.to_string(),
            })?;

        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        self.validate_arguments(name, &arguments)?;

        tracing::debug!(tool = %name, "Executing tool");
        self.executor.execute(kind, &arguments).await
    }

    fn validate_arguments(&self, name: &str, arguments: &Value) -> Result<(), McpError> {
        let Some(validator) = self.validators.get(name) else {
            return Ok(());
        };

        let errors: Vec<String> = validator
            .iter_errors(arguments)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(McpError::InvalidArguments {
                tool: name.to_string(),
                reason: errors.join("; "),
            })
        }
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        vec![ResourceDefinition {
            uri: INSIGHTS_MEMO_URI.to_string(),
            name: "Data Insights Memo".to_string(),
            description: Some("A living document of discovered data insights".to_string()),
            mime_type: "text/plain".to_string(),
        }]
    }

    pub fn read_resource(&self, uri: &str) -> Result<String, McpError> {
        if uri == INSIGHTS_MEMO_URI {
            Ok(self.insights.memo())
        } else {
            Err(McpError::ResourceNotFound {
                uri: uri.to_string(),
            })
        }
    }

    /// Receive the URI of every resource that changes.
    pub fn subscribe_resource_updates(&self) -> broadcast::Receiver<String> {
        self.resource_updates.subscribe()
    }

    pub async fn shutdown(&self) {
        tracing::info!(name = %self.server.name, "Shutting down gateway");
        self.sessions.shutdown().await;
    }
}
