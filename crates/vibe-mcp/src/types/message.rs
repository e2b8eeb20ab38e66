//! Inbound message envelope for the MCP protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{McpError, McpResult};

/// Caller-supplied correlation token, echoed verbatim.
///
/// Any JSON value except `null` is accepted: strings and integers are the
/// common case, but floats, booleans and integers beyond `i64` round-trip
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(Value);

impl CallId {
    /// The token as sent by the caller.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl From<Value> for CallId {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for CallId {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for CallId {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i64> for CallId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

/// A decoded protocol message. The `type` tag selects the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Capability negotiation handshake.
    Negotiate {
        /// Capabilities declared by the client. Stored, never used to subset.
        #[serde(default)]
        client_capabilities: Value,
    },
    /// Invoke a tool.
    ToolCall {
        /// Tool name.
        tool_name: String,
        /// Tool arguments, opaque to the engine.
        #[serde(default = "empty_object")]
        tool_args: Value,
        /// Correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
    },
    /// Fetch a resource by URI.
    ResourceRequest {
        /// Resource URI; its scheme selects the handler.
        resource_uri: String,
        /// Correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
    },
    /// Fetch a prompt by name.
    PromptRequest {
        /// Prompt name.
        prompt_name: String,
        /// Correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<CallId>,
    },
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl InboundMessage {
    /// Decode a message from raw JSON text.
    pub fn decode(raw: &str) -> McpResult<Self> {
        serde_json::from_str(raw).map_err(|e| McpError::InvalidMessage(e.to_string()))
    }

    /// Decode a message from an already-parsed JSON value.
    pub fn from_value(value: Value) -> McpResult<Self> {
        serde_json::from_value(value).map_err(|e| McpError::InvalidMessage(e.to_string()))
    }

    /// The correlation token, if the message carries one.
    pub fn call_id(&self) -> Option<&CallId> {
        match self {
            InboundMessage::Negotiate { .. } => None,
            InboundMessage::ToolCall { call_id, .. }
            | InboundMessage::ResourceRequest { call_id, .. }
            | InboundMessage::PromptRequest { call_id, .. } => call_id.as_ref(),
        }
    }

    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::Negotiate { .. } => "negotiate",
            InboundMessage::ToolCall { .. } => "tool_call",
            InboundMessage::ResourceRequest { .. } => "resource_request",
            InboundMessage::PromptRequest { .. } => "prompt_request",
        }
    }
}

/// Best-effort extraction of `call_id` from text that failed to decode,
/// so error envelopes still correlate when the JSON itself was readable.
pub fn call_id_hint(raw: &str) -> Option<CallId> {
    let value: Value = serde_json::from_str(raw).ok()?;
    call_id_of(&value)
}

/// Extract `call_id` from a JSON object, if present and not `null`.
pub fn call_id_of(value: &Value) -> Option<CallId> {
    value
        .get("call_id")
        .filter(|v| !v.is_null())
        .cloned()
        .map(CallId)
}
