//! Error vocabulary shared by the engine and every transport.

use serde::{Deserialize, Serialize};

use super::message::CallId;
use super::response::Response;

/// Wire-level error codes. Every transport reports failures with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Request needs a negotiated session.
    SessionNotNegotiated,
    /// Missing or unknown session id.
    InvalidSession,
    /// Undecodable payload or unrecognized `type`.
    InvalidMessage,
    /// Tool not in the negotiated manifest.
    UnknownTool,
    /// Tool handler failed.
    ToolExecutionError,
    /// Resource URI scheme not in the negotiated manifest.
    UnknownResourceProtocol,
    /// Resource handler failed.
    ResourceFetchError,
    /// Prompt not in the negotiated manifest.
    UnknownPrompt,
    /// Failure inside a transport before reaching the engine.
    TransportError,
    /// Failure inside the WebSocket adapter before reaching the engine.
    WebsocketError,
    /// Failure on the HTTP negotiate route before reaching the engine.
    NegotiateError,
}

impl ErrorCode {
    /// Wire string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SessionNotNegotiated => "session_not_negotiated",
            ErrorCode::InvalidSession => "invalid_session",
            ErrorCode::InvalidMessage => "invalid_message",
            ErrorCode::UnknownTool => "unknown_tool",
            ErrorCode::ToolExecutionError => "tool_execution_error",
            ErrorCode::UnknownResourceProtocol => "unknown_resource_protocol",
            ErrorCode::ResourceFetchError => "resource_fetch_error",
            ErrorCode::UnknownPrompt => "unknown_prompt",
            ErrorCode::TransportError => "transport_error",
            ErrorCode::WebsocketError => "websocket_error",
            ErrorCode::NegotiateError => "negotiate_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised inside the server.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Session has not been negotiated. Send 'negotiate' first.")]
    SessionNotNegotiated,

    #[error("Invalid or expired session: {0}")]
    InvalidSession(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    ToolExecution(String),

    #[error("Unknown resource protocol: {0}")]
    UnknownResourceProtocol(String),

    #[error("{0}")]
    ResourceFetch(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Negotiation failed: {0}")]
    Negotiate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Map this error to its wire code.
    pub fn code(&self) -> ErrorCode {
        match self {
            McpError::SessionNotNegotiated => ErrorCode::SessionNotNegotiated,
            McpError::InvalidSession(_) => ErrorCode::InvalidSession,
            McpError::InvalidMessage(_) => ErrorCode::InvalidMessage,
            McpError::UnknownTool(_) => ErrorCode::UnknownTool,
            McpError::ToolExecution(_) | McpError::InvalidParams(_) | McpError::NotFound(_) => {
                ErrorCode::ToolExecutionError
            }
            McpError::UnknownResourceProtocol(_) => ErrorCode::UnknownResourceProtocol,
            McpError::ResourceFetch(_) => ErrorCode::ResourceFetchError,
            McpError::UnknownPrompt(_) => ErrorCode::UnknownPrompt,
            McpError::WebSocket(_) => ErrorCode::WebsocketError,
            McpError::Negotiate(_) => ErrorCode::NegotiateError,
            McpError::Transport(_)
            | McpError::Config(_)
            | McpError::Io(_)
            | McpError::Json(_) => ErrorCode::TransportError,
        }
    }

    /// Convert to an error envelope, echoing `call_id`.
    pub fn to_response(&self, call_id: Option<CallId>) -> Response {
        Response::error(self.code(), self.to_string(), call_id)
    }
}

/// Convenience result type.
pub type McpResult<T> = Result<T, McpError>;
