//! Outbound response envelope for the MCP protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::capabilities::{CapabilityManifest, Implementation};
use super::error::ErrorCode;
use super::message::CallId;

/// Marker carried by every successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The request completed.
    Success,
}

/// Resource descriptor returned by a resource handler, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Canonical resource URI.
    pub uri: String,
    /// MIME type of `content`.
    pub mime_type: String,
    /// Human-readable title.
    pub title: String,
    /// Resource body.
    pub content: String,
}

/// Prompt body returned by `prompt_request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBody {
    /// Prompt title.
    pub title: String,
    /// Static prompt content.
    pub content: String,
}

/// Error object within an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Union of every envelope the server writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Result of `negotiate`.
    NegotiateResponse {
        /// Always success.
        status: Status,
        /// Session the manifest is now bound to.
        session_id: String,
        /// Server implementation info.
        server_info: Implementation,
        /// The negotiated capability manifest.
        capabilities: CapabilityManifest,
    },
    /// Result of `tool_call`.
    ToolResponse {
        /// Echoed correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
        /// Always success.
        status: Status,
        /// The handler's result, verbatim.
        result: Value,
    },
    /// Result of `resource_request`.
    ResourceResponse {
        /// Echoed correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
        /// Always success.
        status: Status,
        /// Exactly one descriptor today.
        resources: Vec<ResourceDescriptor>,
    },
    /// Result of `prompt_request`.
    PromptResponse {
        /// Echoed correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
        /// Always success.
        status: Status,
        /// The prompt.
        prompt: PromptBody,
    },
    /// Any failure.
    Error {
        /// Echoed correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
        /// Error details.
        error: ErrorBody,
    },
}

/// Fallback line used if an envelope somehow fails to serialize.
const ENCODE_FAILURE: &str =
    r#"{"type":"error","error":{"code":"transport_error","message":"failed to encode response"}}"#;

impl Response {
    /// Build an error envelope.
    pub fn error(code: ErrorCode, message: impl Into<String>, call_id: Option<CallId>) -> Self {
        Response::Error {
            call_id,
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    /// The echoed correlation token, if any.
    pub fn call_id(&self) -> Option<&CallId> {
        match self {
            Response::NegotiateResponse { .. } => None,
            Response::ToolResponse { call_id, .. }
            | Response::ResourceResponse { call_id, .. }
            | Response::PromptResponse { call_id, .. }
            | Response::Error { call_id, .. } => call_id.as_ref(),
        }
    }

    /// The error code, when this is an error envelope.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Response::Error { error, .. } => Some(error.code),
            _ => None,
        }
    }

    /// Whether this envelope reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Serialize to a single line of JSON (no embedded newlines).
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to encode response: {e}");
            ENCODE_FAILURE.to_string()
        })
    }
}
