//! Resource handler for `config://<section>/<key>`.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::services::ConfigView;
use crate::session::SessionContext;
use crate::types::{McpError, McpResult, ResourceDescriptor, ResourceSchemeDefinition};

use super::registry::parts;
use super::ResourceHandler;

/// Handler for the `config` scheme. Without a section, returns the whole view.
pub struct ConfigResource {
    config: Arc<ConfigView>,
}

impl ConfigResource {
    /// Create the handler over the runtime configuration view.
    pub fn new(config: Arc<ConfigView>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ResourceHandler for ConfigResource {
    fn definition(&self) -> ResourceSchemeDefinition {
        ResourceSchemeDefinition {
            protocol: "config".to_string(),
            description: Some("Configuration values".to_string()),
            uri_template: Some("config://{section}/{key}".to_string()),
        }
    }

    async fn fetch(&self, uri: &Url, _context: &SessionContext) -> McpResult<ResourceDescriptor> {
        let key = parts(uri).join(".");

        let value = if key.is_empty() {
            self.config.snapshot().await
        } else {
            self.config
                .get(&key)
                .await
                .ok_or_else(|| McpError::ResourceFetch(format!("Unknown config key: {key}")))?
        };

        Ok(ResourceDescriptor {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            title: if key.is_empty() {
                "Configuration".to_string()
            } else {
                format!("Configuration: {key}")
            },
            content: serde_json::to_string_pretty(&value)?,
        })
    }
}
