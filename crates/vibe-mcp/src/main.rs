//! VibeMCP server entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use vibe_mcp::config::{load_config, resolve_config_path, ServerConfig};
use vibe_mcp::logging::{self, LogBuffer};
use vibe_mcp::services::Services;
use vibe_mcp::{CapabilityRegistry, McpServer};

#[derive(Parser)]
#[command(
    name = "vibe-mcp",
    about = "MCP server exposing project, file, command, tunnel and config tools",
    version
)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default).
    Serve {
        /// Listen host for HTTP and WebSocket.
        #[arg(long)]
        host: Option<String>,

        /// Listen port for HTTP and WebSocket.
        #[arg(short, long)]
        port: Option<u16>,

        /// Transports to enable; overrides the configuration when given.
        #[arg(short, long, value_enum, value_delimiter = ',')]
        transport: Vec<TransportKind>,
    },

    /// Print the capability manifest as JSON.
    Info,

    /// Validate the configuration and print the effective settings.
    CheckConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    Stdio,
    Http,
    Websocket,
}

fn apply_overrides(
    config: &mut ServerConfig,
    host: Option<String>,
    port: Option<u16>,
    transports: &[TransportKind],
    log_level: Option<String>,
) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if !transports.is_empty() {
        config.transport.stdio = transports.contains(&TransportKind::Stdio);
        config.transport.http = transports.contains(&TransportKind::Http);
        config.transport.websocket = transports.contains(&TransportKind::Websocket);
    }
    if let Some(level) = log_level {
        config.logging.level = level;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        transport: Vec::new(),
    }) {
        Commands::Serve {
            host,
            port,
            transport,
        } => {
            apply_overrides(&mut config, host, port, &transport, cli.log_level);
            config.validate()?;

            let logs = LogBuffer::new(config.logging.buffer_capacity);
            logging::init(&config.logging.level, &logs);
            if let Some(path) = resolve_config_path(cli.config.as_deref()) {
                tracing::info!("Using configuration {}", path.display());
            }

            let server = McpServer::from_config(config, logs)?;
            server.run().await?;
        }

        Commands::Info => {
            config.validate()?;
            let logs = LogBuffer::new(config.logging.buffer_capacity);
            let services = Services::from_config(&config, logs)?;
            let registry = CapabilityRegistry::from_config(&config.capabilities, &services);
            let info = serde_json::json!({
                "server": vibe_mcp::types::Implementation::server(),
                "transports": config.transport.enabled(),
                "capabilities": registry.manifest().as_ref(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::CheckConfig => {
            apply_overrides(&mut config, None, None, &[], cli.log_level);
            config.validate()?;
            match resolve_config_path(cli.config.as_deref()) {
                Some(path) => println!("Configuration OK: {}", path.display()),
                None => println!("Configuration OK: built-in defaults"),
            }
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
