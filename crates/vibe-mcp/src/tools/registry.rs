//! Tool registration and lookup.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::session::SessionContext;
use crate::types::{McpResult, ToolDefinition};

/// A tool the engine can invoke.
///
/// Handlers validate their own arguments and may read or write the session
/// context. Any error (or panic) is reported to the caller as
/// `tool_execution_error`; it never ends the session.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Descriptor advertised during negotiation.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool.
    async fn execute(&self, args: Value, context: &SessionContext) -> McpResult<Value>;
}

/// Ordered name → handler table.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its definition's name, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.definition().name;
        self.tools.insert(name, handler);
    }

    /// Look up a handler.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|h| h.definition()).collect()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
