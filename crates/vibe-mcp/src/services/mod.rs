//! In-process services the built-in tools and resources operate on.

pub mod config_view;
pub mod projects;
pub mod tunnel;

use std::sync::Arc;
use std::time::Duration;

pub use config_view::ConfigView;
pub use projects::{LineRange, ProjectStore};
pub use tunnel::{TunnelManager, TunnelProvider};

use crate::config::ServerConfig;
use crate::logging::LogBuffer;
use crate::types::McpResult;

/// Shared handles passed to the built-in handlers at construction.
#[derive(Debug, Clone)]
pub struct Services {
    /// Project catalog.
    pub projects: Arc<ProjectStore>,
    /// Tunnel record.
    pub tunnel: Arc<TunnelManager>,
    /// Runtime configuration view.
    pub config: Arc<ConfigView>,
    /// Recent log records.
    pub logs: LogBuffer,
    /// Timeout for `exec_command`.
    pub command_timeout: Duration,
}

impl Services {
    /// Build services from the loaded configuration.
    pub fn from_config(config: &ServerConfig, logs: LogBuffer) -> McpResult<Self> {
        let provider = TunnelProvider::parse(&config.tunnel.provider)?;
        let current = serde_json::to_value(config)?;
        let defaults = serde_json::to_value(ServerConfig::default())?;
        Ok(Self {
            projects: Arc::new(ProjectStore::new()),
            tunnel: Arc::new(TunnelManager::new(provider)),
            config: Arc::new(ConfigView::new(current, defaults)),
            logs,
            command_timeout: Duration::from_secs(config.tools.command_timeout_secs),
        })
    }
}
