//! HTTP transport: one request, one response.
//!
//! The session travels in the `X-MCP-Session-ID` header. `POST /mcp/negotiate`
//! creates a session when the header is absent or unknown; the other `/mcp/*`
//! routes reject such requests with `invalid_session` before the engine runs.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::protocol::ProtocolEngine;
use crate::session::SessionId;
use crate::types::{
    call_id_of, ErrorCode, InboundMessage, McpError, McpResult, Response, SERVER_VERSION,
};

use super::SESSION_HEADER;

/// Static facts reported by `GET /api/status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerStatus {
    /// Enabled transports.
    pub transports: Vec<String>,
    /// Whether a tunnel is configured.
    pub tunnel_enabled: bool,
}

/// HTTP adapter. Tracks the sessions it created so they can be torn down.
#[derive(Clone)]
pub struct HttpTransport {
    engine: Arc<ProtocolEngine>,
    owned: Arc<RwLock<HashSet<SessionId>>>,
    status: Arc<ServerStatus>,
}

impl HttpTransport {
    /// Create the adapter.
    pub fn new(engine: Arc<ProtocolEngine>, status: ServerStatus) -> Self {
        Self {
            engine,
            owned: Arc::new(RwLock::new(HashSet::new())),
            status: Arc::new(status),
        }
    }

    /// Router serving the `/mcp/*`, `/health` and `/api/status` routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/status", get(server_status))
            .route("/mcp/events", get(events))
            .route("/mcp/negotiate", post(negotiate))
            .route("/mcp/tool", post(tool))
            .route("/mcp/resource", post(resource))
            .route("/mcp/prompt", post(prompt))
            .route("/mcp/session", delete(close_session))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors()),
            )
            .with_state(self.clone())
    }

    /// Remove every session this adapter created.
    pub async fn close_sessions(&self) {
        let owned: Vec<SessionId> = self.owned.write().await.drain().collect();
        for id in &owned {
            self.engine.sessions().remove(id).await;
        }
        if !owned.is_empty() {
            tracing::info!(count = owned.len(), "Closed HTTP sessions");
        }
    }

    /// Number of live sessions created over HTTP.
    pub async fn session_count(&self) -> usize {
        self.owned.read().await.len()
    }

    /// Existing session named by the header, if any.
    async fn existing_session(&self, headers: &HeaderMap) -> Option<SessionId> {
        let id = SessionId::from(headers.get(SESSION_HEADER)?.to_str().ok()?);
        self.engine.sessions().contains(&id).await.then_some(id)
    }
}

/// Permissive CORS that lets browsers read the session header.
fn cors() -> CorsLayer {
    CorsLayer::permissive().expose_headers([HeaderName::from_static(SESSION_HEADER)])
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": SERVER_VERSION }))
}

async fn server_status(State(http): State<HttpTransport>) -> Json<Value> {
    Json(json!({
        "running": true,
        "version": SERVER_VERSION,
        "transports": http.status.transports,
        "tunnel": { "enabled": http.status.tunnel_enabled },
        "sessions": http.engine.sessions().len().await,
    }))
}

async fn events() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connected = Event::default()
        .event("connected")
        .data(json!({ "status": "connected", "version": SERVER_VERSION }).to_string());
    let stream = stream::once(async move { Ok(connected) }).chain(stream::pending());
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn negotiate(
    State(http): State<HttpTransport>,
    headers: HeaderMap,
    body: Bytes,
) -> HttpResponse {
    let message = match decode_body(&body, "negotiate") {
        Ok(message) => message,
        Err(e) => {
            return envelope(
                Response::error(ErrorCode::NegotiateError, e.to_string(), None),
                None,
            )
        }
    };

    let session_id = match http.existing_session(&headers).await {
        Some(id) => id,
        None => {
            let session = http.engine.sessions().create().await;
            let id = session.id().clone();
            http.owned.write().await.insert(id.clone());
            tracing::debug!(session_id = %id, transport = "http", "HTTP session created");
            id
        }
    };

    let response = http.engine.handle(message, &session_id).await;
    envelope(response, Some(&session_id))
}

async fn tool(State(http): State<HttpTransport>, headers: HeaderMap, body: Bytes) -> HttpResponse {
    dispatch(&http, &headers, &body, "tool_call").await
}

async fn resource(
    State(http): State<HttpTransport>,
    headers: HeaderMap,
    body: Bytes,
) -> HttpResponse {
    dispatch(&http, &headers, &body, "resource_request").await
}

async fn prompt(State(http): State<HttpTransport>, headers: HeaderMap, body: Bytes) -> HttpResponse {
    dispatch(&http, &headers, &body, "prompt_request").await
}

async fn dispatch(http: &HttpTransport, headers: &HeaderMap, body: &[u8], kind: &str) -> HttpResponse {
    let Some(session_id) = http.existing_session(headers).await else {
        let call_id = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| call_id_of(&v));
        return envelope(
            Response::error(
                ErrorCode::InvalidSession,
                "Missing or unknown X-MCP-Session-ID header",
                call_id,
            ),
            None,
        );
    };

    let response = match decode_body(body, kind) {
        Ok(message) => http.engine.handle(message, &session_id).await,
        Err(e) => {
            let call_id = serde_json::from_slice::<Value>(body)
                .ok()
                .and_then(|v| call_id_of(&v));
            e.to_response(call_id)
        }
    };
    envelope(response, Some(&session_id))
}

async fn close_session(State(http): State<HttpTransport>, headers: HeaderMap) -> HttpResponse {
    match http.existing_session(&headers).await {
        Some(id) => {
            http.owned.write().await.remove(&id);
            http.engine.sessions().remove(&id).await;
            tracing::debug!(session_id = %id, "HTTP session closed");
            StatusCode::NO_CONTENT.into_response()
        }
        None => envelope(
            Response::error(
                ErrorCode::InvalidSession,
                "Missing or unknown X-MCP-Session-ID header",
                None,
            ),
            None,
        ),
    }
}

/// Parse a request body into a message of the route's type. An empty body
/// counts as `{}`.
fn decode_body(body: &[u8], kind: &str) -> McpResult<InboundMessage> {
    let mut value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body).map_err(|e| McpError::InvalidMessage(e.to_string()))?
    };
    value
        .as_object_mut()
        .ok_or_else(|| McpError::InvalidMessage("request body must be a JSON object".to_string()))?
        .insert("type".to_string(), Value::String(kind.to_string()));
    InboundMessage::from_value(value)
}

fn status_for(response: &Response) -> StatusCode {
    match response.error_code() {
        Some(ErrorCode::InvalidSession) => StatusCode::UNAUTHORIZED,
        Some(ErrorCode::InvalidMessage | ErrorCode::NegotiateError) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    }
}

fn envelope(response: Response, session_id: Option<&SessionId>) -> HttpResponse {
    let mut http_response = (status_for(&response), Json(response)).into_response();
    if let Some(value) = session_id.and_then(|id| HeaderValue::from_str(id.as_str()).ok()) {
        http_response.headers_mut().insert(SESSION_HEADER, value);
    }
    http_response
}
