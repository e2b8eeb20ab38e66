//! `manage_config` tool: read and change the runtime configuration view.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::ConfigView;
use crate::session::SessionContext;
use crate::types::{McpError, McpResult, ToolDefinition};

use super::ToolHandler;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ConfigAction {
    Get {
        #[serde(default)]
        key: Option<String>,
    },
    Set {
        key: String,
        value: Value,
    },
    Reset {
        #[serde(default)]
        key: Option<String>,
    },
}

/// Handler for `manage_config`.
pub struct ManageConfig {
    config: Arc<ConfigView>,
}

impl ManageConfig {
    /// Create the handler over the shared configuration view.
    pub fn new(config: Arc<ConfigView>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolHandler for ManageConfig {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "manage_config".to_string(),
            description: Some("Get, set or reset configuration values by dotted key".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["get", "set", "reset"] },
                    "key": { "type": "string", "description": "Dotted key such as server.port" },
                    "value": { "description": "New value (set only)" }
                },
                "required": ["action"]
            }),
        }
    }

    async fn execute(&self, args: Value, _context: &SessionContext) -> McpResult<Value> {
        let action: ConfigAction =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        match action {
            ConfigAction::Get { key: None } => Ok(json!({ "config": self.config.snapshot().await })),
            ConfigAction::Get { key: Some(key) } => {
                let value = self
                    .config
                    .get(&key)
                    .await
                    .ok_or_else(|| McpError::NotFound(format!("config key {key}")))?;
                Ok(json!({ "key": key, "value": value }))
            }
            ConfigAction::Set { key, value } => {
                let previous = self.config.set(&key, value.clone()).await?;
                tracing::info!(key = %key, "Configuration value changed");
                Ok(json!({ "key": key, "value": value, "previous": previous }))
            }
            ConfigAction::Reset { key } => {
                self.config.reset(key.as_deref()).await?;
                Ok(json!({ "reset": key.unwrap_or_else(|| "all".to_string()) }))
            }
        }
    }
}
