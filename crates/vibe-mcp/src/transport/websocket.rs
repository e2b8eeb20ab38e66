//! WebSocket transport: one session per connection at `GET /mcp/ws`.
//!
//! The first outbound frame announces the session id. `negotiate` frames are
//! handled before the next frame is read; tool, resource and prompt frames
//! run concurrently and their responses go out in completion order.
//!
//! Each connection has a bounded outbound queue and a cap on in-flight calls.
//! When either is full the socket is not read until a slot frees up.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, Semaphore};

use crate::protocol::ProtocolEngine;
use crate::types::{call_id_hint, ErrorCode, InboundMessage, Response};

use super::ShutdownSignal;

/// Outbound frames buffered per connection before reads pause.
pub const OUTBOUND_QUEUE: usize = 64;

/// Concurrent tool, resource and prompt calls per connection.
pub const MAX_IN_FLIGHT: usize = 32;

/// WebSocket adapter.
#[derive(Clone)]
pub struct WebSocketTransport {
    engine: Arc<ProtocolEngine>,
    shutdown: ShutdownSignal,
}

impl WebSocketTransport {
    /// Create the adapter. Open connections close when `shutdown` fires.
    pub fn new(engine: Arc<ProtocolEngine>, shutdown: ShutdownSignal) -> Self {
        Self { engine, shutdown }
    }

    /// Router serving the upgrade endpoint.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/mcp/ws", get(upgrade))
            .with_state(self.clone())
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(transport): State<WebSocketTransport>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, transport))
}

async fn serve_socket(socket: WebSocket, transport: WebSocketTransport) {
    let WebSocketTransport {
        engine,
        mut shutdown,
    } = transport;
    let session_id = engine.sessions().create().await.id().clone();
    tracing::info!(session_id = %session_id, transport = "websocket", "WebSocket connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let in_flight = Arc::new(Semaphore::new(MAX_IN_FLIGHT));

    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                tracing::debug!("WebSocket send failed: {e}");
                break;
            }
        }
        let _ = sink.close().await;
    });

    let hello = json!({ "type": "session", "session_id": session_id.as_str() }).to_string();
    let mut open = queue(&tx, hello, &mut shutdown).await;

    while open {
        let frame = tokio::select! {
            _ = shutdown.recv() => break,
            frame = stream.next() => frame,
        };
        let text = match frame {
            None | Some(Ok(Message::Close(_))) => break,
            Some(Err(e)) => {
                tracing::warn!(session_id = %session_id, "WebSocket receive failed: {e}");
                break;
            }
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    let error = Response::error(
                        ErrorCode::WebsocketError,
                        format!("Binary frame is not valid UTF-8: {e}"),
                        None,
                    );
                    open = queue(&tx, error.encode(), &mut shutdown).await;
                    continue;
                }
            },
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
        };

        let message = match InboundMessage::decode(&text) {
            Ok(message) => message,
            Err(e) => {
                let error = e.to_response(call_id_hint(&text)).encode();
                open = queue(&tx, error, &mut shutdown).await;
                continue;
            }
        };

        if matches!(message, InboundMessage::Negotiate { .. }) {
            let response = engine.handle(message, &session_id).await;
            open = queue(&tx, response.encode(), &mut shutdown).await;
            continue;
        }

        let permit = tokio::select! {
            _ = shutdown.recv() => break,
            permit = in_flight.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };
        let engine = engine.clone();
        let session_id = session_id.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = engine.handle(message, &session_id).await;
            if tx.send(response.encode()).await.is_err() {
                tracing::debug!(session_id = %session_id, "Dropped response for closed socket");
            }
            drop(permit);
        });
    }

    // In-flight calls keep their sender clones; the writer exits once the
    // last one is dropped.
    engine.sessions().remove(&session_id).await;
    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

/// Queue an outbound frame, waiting for room. Returns `false` once the writer
/// is gone or shutdown fires.
async fn queue(tx: &mpsc::Sender<String>, text: String, shutdown: &mut ShutdownSignal) -> bool {
    tokio::select! {
        _ = shutdown.recv() => false,
        sent = tx.send(text) => sent.is_ok(),
    }
}
