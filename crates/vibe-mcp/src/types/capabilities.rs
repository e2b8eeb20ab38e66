//! Capability descriptors and the negotiated manifest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server name constant.
pub const SERVER_NAME: &str = "vibe-mcp";

/// Server version constant.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Implementation info for the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// Name of the implementation.
    pub name: String,
    /// Version string.
    pub version: String,
}

impl Implementation {
    /// Info describing this server.
    pub fn server() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        }
    }
}

/// Tool descriptor advertised during negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique).
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema describing the arguments. Validated by the handler, not the engine.
    pub input_schema: Value,
}

/// Resource URI scheme descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchemeDefinition {
    /// URI scheme without the trailing colon, e.g. `project`.
    pub protocol: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example URI shape, e.g. `project://{name}/{path}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_template: Option<String>,
}

/// Prompt descriptor advertised during negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Prompt name (unique).
    pub name: String,
    /// Prompt title.
    pub title: String,
}

/// The capability manifest fixed on a session at negotiation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityManifest {
    /// Available tools, in registration order.
    pub tools: Vec<ToolDefinition>,
    /// Available resource schemes, in registration order.
    pub resources: Vec<ResourceSchemeDefinition>,
    /// Available prompts, in registration order.
    pub prompts: Vec<PromptDefinition>,
}

impl CapabilityManifest {
    /// Whether the manifest advertises the named tool.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Whether the manifest advertises the resource scheme.
    pub fn has_resource_protocol(&self, protocol: &str) -> bool {
        self.resources.iter().any(|r| r.protocol == protocol)
    }

    /// Whether the manifest advertises the named prompt.
    pub fn has_prompt(&self, name: &str) -> bool {
        self.prompts.iter().any(|p| p.name == name)
    }

    /// Whether every entry of `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &CapabilityManifest) -> bool {
        self.tools.iter().all(|t| other.has_tool(&t.name))
            && self
                .resources
                .iter()
                .all(|r| other.has_resource_protocol(&r.protocol))
            && self.prompts.iter().all(|p| other.has_prompt(&p.name))
    }
}
