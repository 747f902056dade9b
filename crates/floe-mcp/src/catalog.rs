//! Built-in tool catalog.
//!
//! | Tool | Tags | Purpose |
//! |------|------|---------|
//! | `health_check` | | Report whether a warehouse session is live |
//! | `list_databases` | | List databases (exclusions applied) |
//! | `list_schemas` | | List schemas of a database (exclusions applied) |
//! | `list_tables` | | List tables of a schema (exclusions applied) |
//! | `describe_table` | | Columns of `database.schema.table` |
//! | `read_query` | | Run a statement through the read-only channel |
//! | `append_insight` | | Add a finding to the insight memo |
//! | `write_query` | `write` | Always refused |
//! | `create_table` | `write` | Always refused |

use crate::protocol::{ToolAnnotations, ToolDefinition};
use floe_core::ServerConfig;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Tag carried by tools that would mutate the warehouse.
pub const WRITE_TAG: &str = "write";

/// The built-in tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    HealthCheck,
    ListDatabases,
    ListSchemas,
    ListTables,
    DescribeTable,
    ReadQuery,
    AppendInsight,
    WriteQuery,
    CreateTable,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::HealthCheck,
        ToolKind::ListDatabases,
        ToolKind::ListSchemas,
        ToolKind::ListTables,
        ToolKind::DescribeTable,
        ToolKind::ReadQuery,
        ToolKind::AppendInsight,
        ToolKind::WriteQuery,
        ToolKind::CreateTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::HealthCheck => "health_check",
            ToolKind::ListDatabases => "list_databases",
            ToolKind::ListSchemas => "list_schemas",
            ToolKind::ListTables => "list_tables",
            ToolKind::DescribeTable => "describe_table",
            ToolKind::ReadQuery => "read_query",
            ToolKind::AppendInsight => "append_insight",
            ToolKind::WriteQuery => "write_query",
            ToolKind::CreateTable => "create_table",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether the tool belongs to the write surface.
    pub fn is_write(self) -> bool {
        matches!(self, ToolKind::WriteQuery | ToolKind::CreateTable)
    }

    fn description(self) -> &'static str {
        match self {
            ToolKind::HealthCheck => "Check if the server is running and has a live warehouse session",
            ToolKind::ListDatabases => "List the databases available in the warehouse",
            ToolKind::ListSchemas => "List the schemas of a database",
            ToolKind::ListTables => "List the tables of a schema, with their comments",
            ToolKind::DescribeTable => "Get the column information for a specific table",
            ToolKind::ReadQuery => "Execute a read-only SQL query (SELECT, WITH ... SELECT, SHOW, DESCRIBE)",
            ToolKind::AppendInsight => "Add a data insight to the memo resource",
            ToolKind::WriteQuery => "Execute an INSERT, UPDATE or DELETE query",
            ToolKind::CreateTable => "Create a new table",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            ToolKind::HealthCheck | ToolKind::ListDatabases => json!({
                "type": "object",
                "properties": {}
            }),
            ToolKind::ListSchemas => json!({
                "type": "object",
                "properties": {
                    "database": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Database name"
                    }
                },
                "required": ["database"]
            }),
            ToolKind::ListTables => json!({
                "type": "object",
                "properties": {
                    "database": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Database name"
                    },
                    "schema": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Schema name"
                    }
                },
                "required": ["database", "schema"]
            }),
            ToolKind::DescribeTable => json!({
                "type": "object",
                "properties": {
                    "table_name": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Fully qualified table name in the format 'database.schema.table'"
                    }
                },
                "required": ["table_name"]
            }),
            ToolKind::ReadQuery => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "minLength": 1,
                        "description": "SELECT SQL query to execute"
                    }
                },
                "required": ["query"]
            }),
            ToolKind::AppendInsight => json!({
                "type": "object",
                "properties": {
                    "insight": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Data insight discovered from analysis"
                    }
                },
                "required": ["insight"]
            }),
            ToolKind::WriteQuery | ToolKind::CreateTable => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "SQL statement to execute"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// Build the advertised definition.
    pub fn definition(self) -> ToolDefinition {
        let tags = if self.is_write() {
            vec![WRITE_TAG.to_string()]
        } else {
            Vec::new()
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
            annotations: Some(ToolAnnotations {
                read_only: Some(!self.is_write()),
                tags,
            }),
        }
    }
}

/// The tools visible on one gateway, ordered by name.
///
/// Each definition is kept next to the [`ToolKind`] that executes it.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, (ToolKind, ToolDefinition)>,
}

impl ToolRegistry {
    /// Build the registry of tools visible under `server`.
    ///
    /// Excluded tools are dropped; write-tagged tools are dropped unless
    /// `allow_write` is set.
    pub fn for_server(server: &ServerConfig) -> Self {
        let mut tools = BTreeMap::new();

        for kind in ToolKind::ALL {
            if server.is_tool_excluded(kind.name()) {
                continue;
            }
            let definition = kind.definition();
            if definition.has_tag(WRITE_TAG) && !server.allow_write {
                continue;
            }
            tools.insert(kind.name(), (kind, definition));
        }

        let registry = Self { tools };
        tracing::debug!(
            tools = ?registry.names(),
            allow_write = server.allow_write,
            "Built tool registry"
        );
        registry
    }

    /// Resolve a visible tool by name.
    pub fn resolve(&self, name: &str) -> Option<ToolKind> {
        self.tools.get(name).map(|(kind, _)| *kind)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|(_, definition)| definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|(_, definition)| definition)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// Whether any visible tool is write-tagged.
    pub fn has_write_tools(&self) -> bool {
        self.tools.values().any(|(kind, _)| kind.is_write())
    }
}
