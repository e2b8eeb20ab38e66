//! Server assembly and lifecycle: builds the core from configuration and
//! runs the enabled transports until shutdown.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::logging::LogBuffer;
use crate::protocol::ProtocolEngine;
use crate::registry::CapabilityRegistry;
use crate::services::Services;
use crate::session::SessionStore;
use crate::transport::{shutdown_channel, ShutdownSignal, ShutdownTrigger};
use crate::types::{McpError, McpResult};

/// A configured server: registry, session store, engine and transports.
pub struct McpServer {
    config: ServerConfig,
    engine: Arc<ProtocolEngine>,
    trigger: ShutdownTrigger,
    signal: ShutdownSignal,
}

impl McpServer {
    /// Build the core from configuration.
    pub fn from_config(config: ServerConfig, logs: LogBuffer) -> McpResult<Self> {
        let services = Services::from_config(&config, logs)?;
        let registry = Arc::new(CapabilityRegistry::from_config(&config.capabilities, &services));
        let engine = Arc::new(ProtocolEngine::new(registry, Arc::new(SessionStore::new())));
        let (trigger, signal) = shutdown_channel();
        Ok(Self {
            config,
            engine,
            trigger,
            signal,
        })
    }

    /// The protocol engine shared by every transport.
    pub fn engine(&self) -> &Arc<ProtocolEngine> {
        &self.engine
    }

    /// The configuration the server was built from.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle that stops a running server from another task.
    pub fn shutdown_handle(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Request shutdown. Transports stop and remove their sessions.
    pub fn stop(&self) {
        tracing::info!("Shutdown requested");
        self.trigger.trigger();
    }

    /// HTTP and WebSocket routes merged on one router, per the enabled transports.
    #[cfg(feature = "http")]
    pub fn router(&self) -> (axum::Router, Option<crate::transport::HttpTransport>) {
        let mut router = axum::Router::new();
        let mut http = None;
        if self.config.transport.http {
            let transport = crate::transport::HttpTransport::new(
                self.engine.clone(),
                crate::transport::ServerStatus {
                    transports: self
                        .config
                        .transport
                        .enabled()
                        .into_iter()
                        .map(String::from)
                        .collect(),
                    tunnel_enabled: self.config.tunnel.enabled,
                },
            );
            router = router.merge(transport.router());
            http = Some(transport);
        }
        #[cfg(feature = "websocket")]
        if self.config.transport.websocket {
            let transport =
                crate::transport::WebSocketTransport::new(self.engine.clone(), self.signal.clone());
            router = router.merge(transport.router());
        }
        (router, http)
    }

    /// Run until Ctrl-C, SIGTERM, [`stop`](Self::stop), or end of stdin when
    /// stdio is the only transport. Failing to bind the listener is fatal.
    pub async fn run(&self) -> McpResult<()> {
        let transports = &self.config.transport;
        let mut tasks: JoinSet<McpResult<()>> = JoinSet::new();

        #[cfg(feature = "http")]
        let http = if transports.needs_listener() {
            let addr = self.config.listen_addr();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| McpError::Transport(format!("Failed to bind {addr}: {e}")))?;
            tracing::info!("Listening on http://{addr} (ws: /mcp/ws)");

            let (router, http) = self.router();
            let mut signal = self.signal.clone();
            tasks.spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async move { signal.recv().await })
                    .await
                    .map_err(|e| McpError::Transport(e.to_string()))
            });
            http
        } else {
            None
        };
        #[cfg(not(feature = "http"))]
        if transports.needs_listener() {
            tracing::warn!("HTTP/WebSocket transports requested but not compiled in");
        }

        #[cfg(feature = "stdio")]
        if transports.stdio {
            let stdio = crate::transport::StdioTransport::new(self.engine.clone());
            let signal = self.signal.clone();
            let stop_when_done = (!transports.needs_listener()).then(|| self.trigger.clone());
            tasks.spawn(async move {
                let result = stdio.run(signal).await;
                if let Some(trigger) = stop_when_done {
                    trigger.trigger();
                }
                result
            });
        }
        #[cfg(not(feature = "stdio"))]
        if transports.stdio {
            tracing::warn!("Stdio transport requested but not compiled in");
        }

        if tasks.is_empty() {
            return Err(McpError::Config("no transport could be started".to_string()));
        }

        tracing::info!(transports = ?transports.enabled(), "Server running");
        let mut signal = self.signal.clone();
        tokio::select! {
            _ = terminate() => tracing::info!("Received termination signal"),
            _ = signal.recv() => {}
        }
        self.trigger.trigger();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Transport ended with error: {e}"),
                Err(e) => tracing::error!("Transport task failed: {e}"),
            }
        }

        #[cfg(feature = "http")]
        if let Some(http) = http {
            http.close_sessions().await;
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn terminate() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
}
