//! Resource handler for `logs://<service>/<level>`: recent log records.

use async_trait::async_trait;
use tracing::Level;
use url::Url;

use crate::logging::{parse_level, LogBuffer};
use crate::session::SessionContext;
use crate::types::{McpError, McpResult, ResourceDescriptor, ResourceSchemeDefinition};

use super::registry::parts;
use super::ResourceHandler;

/// Handler for the `logs` scheme.
///
/// `service` names the log source; `server` (or `all`) returns every record,
/// anything else filters by target prefix.
pub struct LogsResource {
    buffer: LogBuffer,
}

impl LogsResource {
    /// Create the handler over the process log buffer.
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

#[async_trait]
impl ResourceHandler for LogsResource {
    fn definition(&self) -> ResourceSchemeDefinition {
        ResourceSchemeDefinition {
            protocol: "logs".to_string(),
            description: Some("Recent server log records".to_string()),
            uri_template: Some("logs://{service}/{level}".to_string()),
        }
    }

    async fn fetch(&self, uri: &Url, _context: &SessionContext) -> McpResult<ResourceDescriptor> {
        let parts = parts(uri);
        let service = parts.first().copied().unwrap_or("server");
        let level = match parts.get(1) {
            Some(name) => parse_level(name)
                .ok_or_else(|| McpError::ResourceFetch(format!("Unknown log level: {name}")))?,
            None => Level::INFO,
        };

        let all = matches!(service, "server" | "all");
        let target_prefix = service.replace('-', "_");
        let content = self
            .buffer
            .records_at_least(level)
            .into_iter()
            .filter(|r| all || r.target.starts_with(&target_prefix))
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ResourceDescriptor {
            uri: uri.to_string(),
            mime_type: "text/plain".to_string(),
            title: format!("{service} logs ({})", level.to_string().to_lowercase()),
            content,
        })
    }
}
