//! VibeMCP server: one protocol engine for tools, resources and prompts,
//! served over stdio, HTTP and WebSocket.
//!
//! Transports own connections and sessions; the [`ProtocolEngine`] owns the
//! negotiation gate, dispatch and the error vocabulary, so every transport
//! reports failures identically.

pub mod config;
pub mod logging;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod server;
pub mod services;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use protocol::ProtocolEngine;
pub use registry::CapabilityRegistry;
pub use server::McpServer;
pub use session::{SessionId, SessionStore};
