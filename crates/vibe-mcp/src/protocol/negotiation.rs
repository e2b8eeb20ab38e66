//! Capability negotiation: binds the registry manifest to a session.

use serde_json::Value;

use crate::registry::CapabilityRegistry;
use crate::session::Session;
use crate::types::{Implementation, McpError, McpResult, Response, Status};

/// Fix the full registry manifest on `session` and move it to `READY`.
///
/// Re-negotiating refreshes the manifest. Client capabilities are recorded on
/// the session and never narrow the manifest.
pub async fn negotiate(
    session: &Session,
    registry: &CapabilityRegistry,
    client_capabilities: Value,
) -> McpResult<Response> {
    let manifest = registry.manifest();
    let renegotiation = session.manifest().await.is_some();

    if !session
        .mark_ready(manifest.clone(), client_capabilities.clone())
        .await
    {
        return Err(McpError::InvalidSession(session.id().to_string()));
    }

    tracing::info!(
        session_id = %session.id(),
        renegotiation,
        client_capabilities = %client_capabilities,
        "Session negotiated"
    );

    Ok(Response::NegotiateResponse {
        status: Status::Success,
        session_id: session.id().to_string(),
        server_info: Implementation::server(),
        capabilities: (*manifest).clone(),
    })
}
