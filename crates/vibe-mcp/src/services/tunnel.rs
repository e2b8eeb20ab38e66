//! Tunnel bookkeeping. The provider subprocesses themselves live outside
//! this crate; this records which tunnel is active and where it points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::types::{McpError, McpResult};

/// Supported tunnel providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunnelProvider {
    /// ngrok.
    Ngrok,
    /// Cloudflare quick tunnels.
    Cloudflare,
}

impl TunnelProvider {
    /// Parse a provider name.
    pub fn parse(name: &str) -> McpResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ngrok" => Ok(TunnelProvider::Ngrok),
            "cloudflare" => Ok(TunnelProvider::Cloudflare),
            other => Err(McpError::InvalidParams(format!(
                "Unknown tunnel provider: {other} (expected ngrok or cloudflare)"
            ))),
        }
    }

    fn public_url(&self) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let host = &id[..12];
        match self {
            TunnelProvider::Ngrok => format!("https://{host}.ngrok.io"),
            TunnelProvider::Cloudflare => format!("https://{host}.trycloudflare.com"),
        }
    }
}

/// A running tunnel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTunnel {
    /// Provider serving the tunnel.
    pub provider: TunnelProvider,
    /// Public URL.
    pub url: String,
    /// Start time.
    pub started_at: DateTime<Utc>,
}

/// Process-wide tunnel record, shared by every session.
#[derive(Debug)]
pub struct TunnelManager {
    default_provider: TunnelProvider,
    active: RwLock<Option<ActiveTunnel>>,
}

impl TunnelManager {
    /// Create a manager with the configured default provider.
    pub fn new(default_provider: TunnelProvider) -> Self {
        Self {
            default_provider,
            active: RwLock::new(None),
        }
    }

    /// Start a tunnel. Fails if one is already running.
    pub async fn start(&self, provider: Option<TunnelProvider>) -> McpResult<ActiveTunnel> {
        let mut active = self.active.write().await;
        if let Some(running) = active.as_ref() {
            return Err(McpError::InvalidParams(format!(
                "A tunnel is already running at {}",
                running.url
            )));
        }
        let provider = provider.unwrap_or(self.default_provider);
        let tunnel = ActiveTunnel {
            provider,
            url: provider.public_url(),
            started_at: Utc::now(),
        };
        tracing::info!(url = %tunnel.url, ?provider, "Tunnel started");
        *active = Some(tunnel.clone());
        Ok(tunnel)
    }

    /// Stop the running tunnel, returning it.
    pub async fn stop(&self) -> Option<ActiveTunnel> {
        let stopped = self.active.write().await.take();
        if let Some(tunnel) = &stopped {
            tracing::info!(url = %tunnel.url, "Tunnel stopped");
        }
        stopped
    }

    /// The running tunnel, if any.
    pub async fn status(&self) -> Option<ActiveTunnel> {
        self.active.read().await.clone()
    }
}
