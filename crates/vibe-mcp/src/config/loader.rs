//! Configuration file discovery, parsing and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::{BUILTIN_PROMPTS, BUILTIN_RESOURCES, BUILTIN_TOOLS};
use crate::types::{McpError, McpResult};

/// Default config directory under the user's home.
const CONFIG_DIR: &str = ".vibemcp";

/// Default config file name.
const CONFIG_FILE: &str = "config.toml";

/// Top-level server configuration. Read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener settings for HTTP and WebSocket.
    pub server: ListenConfig,
    /// Which transports to start.
    pub transport: TransportConfig,
    /// Which capabilities to expose.
    pub capabilities: CapabilityConfig,
    /// Built-in tool settings.
    pub tools: ToolsConfig,
    /// Tunnel settings.
    pub tunnel: TunnelConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3456,
        }
    }
}

/// Transport toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Line-oriented stdin/stdout transport.
    pub stdio: bool,
    /// Request/response HTTP routes.
    pub http: bool,
    /// Persistent WebSocket connections.
    pub websocket: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            stdio: true,
            http: true,
            websocket: true,
        }
    }
}

impl TransportConfig {
    /// Whether a TCP listener is needed.
    pub fn needs_listener(&self) -> bool {
        self.http || self.websocket
    }

    /// Names of the enabled transports.
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.stdio {
            names.push("stdio");
        }
        if self.http {
            names.push("http");
        }
        if self.websocket {
            names.push("websocket");
        }
        names
    }
}

/// Enabled capability names. `None` enables every built-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityConfig {
    /// Enabled tool names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    /// Enabled resource schemes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    /// Enabled prompt names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<String>>,
}

impl CapabilityConfig {
    /// Whether a tool is enabled.
    pub fn tool_enabled(&self, name: &str) -> bool {
        enabled(&self.tools, name)
    }

    /// Whether a resource scheme is enabled.
    pub fn resource_enabled(&self, protocol: &str) -> bool {
        enabled(&self.resources, protocol)
    }

    /// Whether a prompt is enabled.
    pub fn prompt_enabled(&self, name: &str) -> bool {
        enabled(&self.prompts, name)
    }
}

fn enabled(list: &Option<Vec<String>>, name: &str) -> bool {
    list.as_ref().map_or(true, |names| names.iter().any(|n| n == name))
}

/// Built-in tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Timeout for `exec_command`, in seconds.
    pub command_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
        }
    }
}

/// Tunnel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunnelConfig {
    /// Whether a tunnel is expected to be running.
    pub enabled: bool,
    /// Default provider (`ngrok` or `cloudflare`).
    pub provider: String,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "ngrok".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level filter; `RUST_LOG` overrides it.
    pub level: String,
    /// Records kept for the `logs://` resource.
    pub buffer_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            buffer_capacity: 500,
        }
    }
}

impl ServerConfig {
    /// `host:port` for the TCP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check the configuration for values the server cannot run with.
    pub fn validate(&self) -> McpResult<()> {
        if self.transport.needs_listener() && self.server.port == 0 {
            return Err(McpError::Config("server.port must not be 0".to_string()));
        }
        if self.transport.enabled().is_empty() {
            return Err(McpError::Config(
                "at least one transport must be enabled".to_string(),
            ));
        }
        if self.logging.buffer_capacity == 0 {
            return Err(McpError::Config(
                "logging.buffer_capacity must be greater than 0".to_string(),
            ));
        }
        check_known("capabilities.tools", &self.capabilities.tools, BUILTIN_TOOLS)?;
        check_known(
            "capabilities.resources",
            &self.capabilities.resources,
            BUILTIN_RESOURCES,
        )?;
        check_known("capabilities.prompts", &self.capabilities.prompts, BUILTIN_PROMPTS)?;
        Ok(())
    }
}

fn check_known(field: &str, names: &Option<Vec<String>>, known: &[&str]) -> McpResult<()> {
    let Some(names) = names else {
        return Ok(());
    };
    if let Some(unknown) = names.iter().find(|n| !known.contains(&n.as_str())) {
        return Err(McpError::Config(format!(
            "{field}: unknown entry '{unknown}' (known: {})",
            known.join(", ")
        )));
    }
    Ok(())
}

/// Default config file location: `~/.vibemcp/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Pick the config file to read: the explicit path, else the default
/// location if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    default_config_path().filter(|p| p.exists())
}

/// Load the configuration. Without a file, built-in defaults apply.
///
/// Not validated here: callers apply command-line overrides first, then call
/// [`ServerConfig::validate`].
pub fn load_config(explicit: Option<&Path>) -> McpResult<ServerConfig> {
    let config = match resolve_config_path(explicit) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            let text = std::fs::read_to_string(&path).map_err(|e| {
                McpError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            parse_config(&text)
                .map_err(|e| McpError::Config(format!("{}: {e}", path.display())))?
        }
        None => ServerConfig::default(),
    };
    Ok(config)
}

/// Parse TOML text into a configuration (without validating it).
pub fn parse_config(text: &str) -> Result<ServerConfig, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr(), "127.0.0.1:3456");
        assert_eq!(config.transport.enabled(), vec!["stdio", "http", "websocket"]);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.transport.stdio);
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(parse_config("[server]\nprot = 1\n").is_err());
    }

    #[test]
    fn unknown_capability_rejected() {
        let config = parse_config("[capabilities]\ntools = [\"launch_rockets\"]\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("launch_rockets"));
    }

    #[test]
    fn no_transport_rejected() {
        let config =
            parse_config("[transport]\nstdio = false\nhttp = false\nwebsocket = false\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn load_defers_validation_to_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[transport]\nstdio = false\nhttp = false\nwebsocket = false\n")
            .unwrap();

        let mut config = load_config(Some(&path)).unwrap();
        assert!(config.validate().is_err());

        config.transport.stdio = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[capabilities]\nprompts = [\"code_review\"]\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(config.capabilities.prompt_enabled("code_review"));
        assert!(!config.capabilities.prompt_enabled("project_setup"));
        assert!(config.capabilities.tool_enabled("manage_project"));
    }
}
