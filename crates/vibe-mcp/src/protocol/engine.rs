//! The protocol engine: negotiation gate, dispatch and error vocabulary
//! shared by every transport.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use url::Url;

use crate::registry::CapabilityRegistry;
use crate::session::{Session, SessionId, SessionStore};
use crate::types::{
    call_id_hint, CallId, CapabilityManifest, InboundMessage, McpError, McpResult, Response,
    Status,
};

use super::negotiation;

/// Handles decoded messages against the session store and capability registry.
///
/// Cheap to share behind an `Arc`; every method takes `&self` and may be
/// called concurrently for any number of sessions.
#[derive(Debug)]
pub struct ProtocolEngine {
    registry: Arc<CapabilityRegistry>,
    sessions: Arc<SessionStore>,
}

impl ProtocolEngine {
    /// Create an engine over a registry and a session store.
    pub fn new(registry: Arc<CapabilityRegistry>, sessions: Arc<SessionStore>) -> Self {
        Self { registry, sessions }
    }

    /// The session store transports create and remove sessions in.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// The capability registry.
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Decode raw JSON text and handle it. Undecodable input yields
    /// `invalid_message`, echoing `call_id` when one can be recovered.
    pub async fn handle_raw(&self, raw: &str, session_id: &SessionId) -> Response {
        match InboundMessage::decode(raw) {
            Ok(message) => self.handle(message, session_id).await,
            Err(e) => {
                tracing::debug!(session_id = %session_id, "Rejected undecodable message: {e}");
                e.to_response(call_id_hint(raw))
            }
        }
    }

    /// Handle one message for `session_id`. Never fails: every error becomes
    /// an error envelope echoing the request's `call_id`.
    pub async fn handle(&self, message: InboundMessage, session_id: &SessionId) -> Response {
        let call_id = message.call_id().cloned();
        let kind = message.kind();

        match self.dispatch(message, session_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    session_id = %session_id,
                    call_id = ?call_id,
                    kind,
                    code = %e.code(),
                    "Request failed: {e}"
                );
                e.to_response(call_id)
            }
        }
    }

    async fn dispatch(&self, message: InboundMessage, session_id: &SessionId) -> McpResult<Response> {
        let session = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| McpError::InvalidSession(session_id.to_string()))?;

        match message {
            InboundMessage::Negotiate {
                client_capabilities,
            } => negotiation::negotiate(&session, &self.registry, client_capabilities).await,
            InboundMessage::ToolCall {
                tool_name,
                tool_args,
                call_id,
            } => {
                let manifest = ready(&session).await?;
                self.call_tool(&session, &manifest, tool_name, tool_args, call_id)
                    .await
            }
            InboundMessage::ResourceRequest {
                resource_uri,
                call_id,
            } => {
                let manifest = ready(&session).await?;
                self.fetch_resource(&session, &manifest, &resource_uri, call_id)
                    .await
            }
            InboundMessage::PromptRequest {
                prompt_name,
                call_id,
            } => {
                let manifest = ready(&session).await?;
                self.get_prompt(&manifest, &prompt_name, call_id)
            }
        }
    }

    async fn call_tool(
        &self,
        session: &Session,
        manifest: &CapabilityManifest,
        tool_name: String,
        tool_args: Value,
        call_id: Option<CallId>,
    ) -> McpResult<Response> {
        let handler = manifest
            .has_tool(&tool_name)
            .then(|| self.registry.tools().get(&tool_name))
            .flatten()
            .ok_or_else(|| McpError::UnknownTool(tool_name.clone()))?;

        tracing::debug!(session_id = %session.id(), tool = %tool_name, call_id = ?call_id, "Calling tool");

        let context = session.context().clone();
        let outcome = AssertUnwindSafe(handler.execute(tool_args, &context))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => Ok(Response::ToolResponse {
                call_id,
                status: Status::Success,
                result,
            }),
            Ok(Err(e)) => {
                tracing::warn!(session_id = %session.id(), tool = %tool_name, "Tool failed: {e}");
                Err(McpError::ToolExecution(e.to_string()))
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!(session_id = %session.id(), tool = %tool_name, "Tool panicked: {reason}");
                Err(McpError::ToolExecution(format!(
                    "Tool '{tool_name}' panicked: {reason}"
                )))
            }
        }
    }

    async fn fetch_resource(
        &self,
        session: &Session,
        manifest: &CapabilityManifest,
        resource_uri: &str,
        call_id: Option<CallId>,
    ) -> McpResult<Response> {
        let uri = Url::parse(resource_uri).map_err(|e| {
            McpError::ResourceFetch(format!("Invalid resource URI '{resource_uri}': {e}"))
        })?;
        let protocol = uri.scheme();
        let handler = manifest
            .has_resource_protocol(protocol)
            .then(|| self.registry.resources().get(protocol))
            .flatten()
            .ok_or_else(|| McpError::UnknownResourceProtocol(protocol.to_string()))?;

        tracing::debug!(session_id = %session.id(), uri = %uri, call_id = ?call_id, "Fetching resource");

        let context = session.context().clone();
        let outcome = AssertUnwindSafe(handler.fetch(&uri, &context))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(descriptor)) => Ok(Response::ResourceResponse {
                call_id,
                status: Status::Success,
                resources: vec![descriptor],
            }),
            Ok(Err(e)) => Err(McpError::ResourceFetch(e.to_string())),
            Err(panic) => Err(McpError::ResourceFetch(format!(
                "Resource handler for '{protocol}' panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }

    fn get_prompt(
        &self,
        manifest: &CapabilityManifest,
        prompt_name: &str,
        call_id: Option<CallId>,
    ) -> McpResult<Response> {
        let template = manifest
            .has_prompt(prompt_name)
            .then(|| self.registry.prompts().get(prompt_name))
            .flatten()
            .ok_or_else(|| McpError::UnknownPrompt(prompt_name.to_string()))?;

        Ok(Response::PromptResponse {
            call_id,
            status: Status::Success,
            prompt: template.body(),
        })
    }
}

/// The session's manifest, or `session_not_negotiated` when it is not `READY`.
async fn ready(session: &Session) -> McpResult<Arc<CapabilityManifest>> {
    session
        .ready_manifest()
        .await
        .ok_or(McpError::SessionNotNegotiated)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
