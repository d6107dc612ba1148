//! MCP capability, identity, and initialization types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The single protocol revision this server declares. No negotiation is done.
pub const MCP_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = "converse-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The three kinds of capability a server exposes. Each kind has its own
/// namespace, so the same name may be registered once per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Prompt,
    Resource,
    Tool,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Prompt => write!(f, "prompt"),
            CapabilityKind::Resource => write!(f, "resource"),
            CapabilityKind::Tool => write!(f, "tool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingCapability {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    #[serde(default)]
    pub subscribe: bool,
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

impl ServerCapabilities {
    /// Turn on the flag for `kind` with default sub-flags, leaving an
    /// explicitly configured flag untouched.
    pub fn enable(&mut self, kind: CapabilityKind) {
        match kind {
            CapabilityKind::Prompt => {
                self.prompts.get_or_insert_with(PromptsCapability::default);
            }
            CapabilityKind::Resource => {
                self.resources.get_or_insert_with(ResourcesCapability::default);
            }
            CapabilityKind::Tool => {
                self.tools.get_or_insert_with(ToolsCapability::default);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}
