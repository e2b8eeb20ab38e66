//! Configuration loading and resolution.

pub mod loader;

pub use loader::{
    default_config_path, load_config, parse_config, resolve_config_path, CapabilityConfig,
    ListenConfig, LoggingConfig, ServerConfig, ToolsConfig, TransportConfig, TunnelConfig,
};
