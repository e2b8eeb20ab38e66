//! Resource scheme registration and lookup.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use url::Url;

use crate::session::SessionContext;
use crate::types::{McpResult, ResourceDescriptor, ResourceSchemeDefinition};

/// A handler for one URI scheme.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Descriptor advertised during negotiation. `protocol` is the URI scheme.
    fn definition(&self) -> ResourceSchemeDefinition;

    /// Fetch the resource named by `uri`.
    async fn fetch(&self, uri: &Url, context: &SessionContext) -> McpResult<ResourceDescriptor>;
}

/// Ordered scheme → handler table.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    schemes: IndexMap<String, Arc<dyn ResourceHandler>>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its scheme, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) {
        let protocol = handler.definition().protocol;
        self.schemes.insert(protocol, handler);
    }

    /// Look up the handler for a scheme.
    pub fn get(&self, protocol: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.schemes.get(protocol).cloned()
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> Vec<ResourceSchemeDefinition> {
        self.schemes.values().map(|h| h.definition()).collect()
    }

    /// Registered schemes, in registration order.
    pub fn protocols(&self) -> Vec<&str> {
        self.schemes.keys().map(String::as_str).collect()
    }

    /// Number of registered schemes.
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    /// Whether no schemes are registered.
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("schemes", &self.protocols())
            .finish()
    }
}

/// Host followed by the non-empty path segments. `project://demo/a/b` and
/// `project:///demo/a/b` both yield `["demo", "a", "b"]`.
pub(crate) fn parts(uri: &Url) -> Vec<&str> {
    let mut parts: Vec<&str> = uri.host_str().filter(|h| !h.is_empty()).into_iter().collect();
    if let Some(segments) = uri.path_segments() {
        parts.extend(segments.filter(|p| !p.is_empty()));
    }
    parts
}
