//! Capability registry: the tools, resource schemes and prompts this server
//! can serve. Read-only once built.

use std::sync::Arc;

use crate::config::CapabilityConfig;
use crate::prompts::{self, PromptRegistry, PromptTemplate};
use crate::resources::{self, ResourceHandler, ResourceRegistry};
use crate::services::Services;
use crate::tools::{self, ToolHandler, ToolRegistry};
use crate::types::CapabilityManifest;

/// Names of the built-in tools.
pub const BUILTIN_TOOLS: &[&str] = &[
    "manage_project",
    "manage_file",
    "exec_command",
    "manage_tunnel",
    "manage_config",
];

/// Schemes of the built-in resource handlers.
pub const BUILTIN_RESOURCES: &[&str] = &["project", "logs", "config"];

/// Names of the built-in prompts.
pub const BUILTIN_PROMPTS: &[&str] = &["project_setup", "code_review", "debug_command"];

/// Three ordered tables plus the manifest derived from them.
#[derive(Debug)]
pub struct CapabilityRegistry {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    prompts: PromptRegistry,
    manifest: Arc<CapabilityManifest>,
}

impl CapabilityRegistry {
    /// Start an empty builder.
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::default()
    }

    /// Registry holding the built-ins enabled by `enabled`.
    pub fn from_config(enabled: &CapabilityConfig, services: &Services) -> Self {
        let mut builder = Self::builder();
        for tool in tools::builtin(services) {
            if enabled.tool_enabled(&tool.definition().name) {
                builder = builder.tool(tool);
            }
        }
        for scheme in resources::builtin(services) {
            if enabled.resource_enabled(&scheme.definition().protocol) {
                builder = builder.resource(scheme);
            }
        }
        for prompt in prompts::builtin() {
            if enabled.prompt_enabled(&prompt.name) {
                builder = builder.prompt(prompt);
            }
        }
        let registry = builder.build();
        tracing::debug!(
            tools = registry.tools.len(),
            resources = registry.resources.len(),
            prompts = registry.prompts.len(),
            "Capability registry built"
        );
        registry
    }

    /// Tool table.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Resource scheme table.
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Prompt table.
    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Manifest handed to every negotiating session.
    pub fn manifest(&self) -> Arc<CapabilityManifest> {
        self.manifest.clone()
    }
}

/// Builder for [`CapabilityRegistry`].
#[derive(Default)]
pub struct CapabilityRegistryBuilder {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    prompts: PromptRegistry,
}

impl CapabilityRegistryBuilder {
    /// Add a tool handler.
    pub fn tool(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.tools.register(handler);
        self
    }

    /// Add a resource scheme handler.
    pub fn resource(mut self, handler: Arc<dyn ResourceHandler>) -> Self {
        self.resources.register(handler);
        self
    }

    /// Add a prompt template.
    pub fn prompt(mut self, template: PromptTemplate) -> Self {
        self.prompts.register(template);
        self
    }

    /// Freeze the tables and compute the manifest.
    pub fn build(self) -> CapabilityRegistry {
        let manifest = Arc::new(CapabilityManifest {
            tools: self.tools.definitions(),
            resources: self.resources.definitions(),
            prompts: self.prompts.definitions(),
        });
        CapabilityRegistry {
            tools: self.tools,
            resources: self.resources,
            prompts: self.prompts,
            manifest,
        }
    }
}
