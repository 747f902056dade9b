//! # floe-mcp
//!
//! Read-only tool gateway between an orchestration client and a data
//! warehouse.
//!
//! ## Architecture
//!
//! ```text
//! Client (list tools / call tool / read resource)
//!       │
//!       ▼
//! ┌──────────────────────┐
//! │  Gateway             │
//! │  1. Visibility       │  ← exclude_tools, allow_write
//! │  2. Validate args    │  ← jsonschema
//! │  3. Build SQL        │  ← floe-sql identifiers
//! │  4. Classify         │  ← floe-sql WriteDetector
//! │  5. Execute          │  ← SessionManager (TTL refresh)
//! │  6. Filter + JSON    │  ← exclude_patterns
//! └──────────┬───────────┘
//!            ▼
//!        Warehouse
//! ```
//!
//! Write tools can be listed (`allow_write`) but are always refused.
//!
//! ## Example Usage
//!
//! ```ignore
//! use floe_core::FloeConfig;
//! use floe_mcp::Gateway;
//!
//! let config = FloeConfig::load("floe.yaml")?;
//! let gateway = Gateway::new(&config, connector)?;
//! gateway.start().await?;
//!
//! let result = gateway
//!     .call_tool("read_query", serde_json::json!({"query": "SELECT 1"}))
//!     .await;
//! ```

pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod insights;
pub mod protocol;
pub mod session;
pub mod warehouse;

pub use catalog::{ToolKind, ToolRegistry, WRITE_TAG};
pub use dispatcher::ReadOnlyDispatcher;
pub use error::McpError;
pub use executor::ToolExecutor;
pub use gateway::Gateway;
pub use insights::{Insight, InsightLog, INSIGHTS_MEMO_URI};
pub use protocol::{
    CallToolResult, EmbeddedResource, ResourceDefinition, ToolAnnotations, ToolContent,
    ToolDefinition,
};
pub use session::SessionManager;
pub use warehouse::{Connector, QueryOutput, Row, Warehouse};
