//! Transport adapters. Each owns the sessions it creates and feeds decoded
//! messages to the shared [`ProtocolEngine`](crate::protocol::ProtocolEngine).

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "stdio")]
pub mod stdio;
#[cfg(feature = "websocket")]
pub mod websocket;

use tokio::sync::watch;

#[cfg(feature = "http")]
pub use http::{HttpTransport, ServerStatus};
#[cfg(feature = "stdio")]
pub use stdio::StdioTransport;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

/// Request/response header carrying the session id over HTTP.
pub const SESSION_HEADER: &str = "x-mcp-session-id";

/// Create a linked shutdown trigger and signal.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger::new(tx), ShutdownSignal(rx))
}

/// Fires shutdown for every [`ShutdownSignal`] cloned from the same channel.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger(std::sync::Arc<watch::Sender<bool>>);

/// Resolves once shutdown has been requested.
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownTrigger {
    fn new(tx: watch::Sender<bool>) -> Self {
        Self(std::sync::Arc::new(tx))
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }

    /// A new signal bound to this trigger.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal(self.0.subscribe())
    }
}

impl ShutdownSignal {
    /// Wait for shutdown. Also returns if the trigger was dropped.
    pub async fn recv(&mut self) {
        let _ = self.0.wait_for(|stop| *stop).await;
    }

    /// Whether shutdown has already been requested.
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }
}
