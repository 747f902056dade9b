//! Tool and resource types exchanged with the orchestration client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition advertised to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

impl ToolDefinition {
    /// Check if the tool carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.annotations
            .as_ref()
            .is_some_and(|a| a.tags.iter().any(|t| t == tag))
    }

    /// Whether the tool is annotated read-only.
    pub fn is_read_only(&self) -> bool {
        self.annotations
            .as_ref()
            .is_some_and(|a| a.read_only == Some(true))
    }
}

/// Tool annotations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolAnnotations {
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Tool response content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "json")]
    Json { json: Value },
    #[serde(rename = "resource")]
    Resource { resource: EmbeddedResource },
}

/// Resource content embedded in a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

/// Result of a tool call.
///
/// Failures are reported in-band with `is_error` set, never as a Rust error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Create a successful result.
    pub fn success(content: Vec<ToolContent>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    /// Create a successful single-text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self::success(vec![ToolContent::Text { text: text.into() }])
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// First text content, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// First JSON content, if any.
    pub fn first_json(&self) -> Option<&Value> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Json { json } => Some(json),
            _ => None,
        })
    }

    /// First embedded resource, if any.
    pub fn first_resource(&self) -> Option<&EmbeddedResource> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Resource { resource } => Some(resource),
            _ => None,
        })
    }
}

/// Resource advertised to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}
