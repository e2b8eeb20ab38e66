//! `manage_tunnel` tool: start, stop and inspect the public tunnel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::{TunnelManager, TunnelProvider};
use crate::session::SessionContext;
use crate::types::{McpError, McpResult, ToolDefinition};

use super::ToolHandler;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum TunnelAction {
    Start {
        #[serde(default)]
        provider: Option<String>,
    },
    Stop,
    Status,
}

/// Handler for `manage_tunnel`.
pub struct ManageTunnel {
    tunnel: Arc<TunnelManager>,
}

impl ManageTunnel {
    /// Create the handler over the shared tunnel record.
    pub fn new(tunnel: Arc<TunnelManager>) -> Self {
        Self { tunnel }
    }
}

#[async_trait]
impl ToolHandler for ManageTunnel {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "manage_tunnel".to_string(),
            description: Some("Start, stop or query the public tunnel".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["start", "stop", "status"] },
                    "provider": { "type": "string", "enum": ["ngrok", "cloudflare"] }
                },
                "required": ["action"]
            }),
        }
    }

    async fn execute(&self, args: Value, _context: &SessionContext) -> McpResult<Value> {
        let action: TunnelAction =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        match action {
            TunnelAction::Start { provider } => {
                let provider = provider.as_deref().map(TunnelProvider::parse).transpose()?;
                let tunnel = self.tunnel.start(provider).await?;
                Ok(json!({ "running": true, "tunnel": tunnel }))
            }
            TunnelAction::Stop => match self.tunnel.stop().await {
                Some(tunnel) => Ok(json!({ "running": false, "stopped": tunnel })),
                None => Err(McpError::InvalidParams("No tunnel is running".to_string())),
            },
            TunnelAction::Status => {
                let tunnel = self.tunnel.status().await;
                Ok(json!({ "running": tunnel.is_some(), "tunnel": tunnel }))
            }
        }
    }
}
