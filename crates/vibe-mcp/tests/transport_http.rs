//! HTTP transport, exercised in-process with `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vibe_mcp::transport::{HttpTransport, ServerStatus, SESSION_HEADER};
use vibe_mcp::ProtocolEngine;

use common::fixtures::test_engine;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn app() -> (HttpTransport, Router) {
    let (_, transport, router) = app_with_engine();
    (transport, router)
}

fn app_with_engine() -> (Arc<ProtocolEngine>, HttpTransport, Router) {
    let engine = test_engine();
    let transport = HttpTransport::new(
        engine.clone(),
        ServerStatus {
            transports: vec!["http".to_string()],
            tunnel_enabled: false,
        },
    );
    let router = transport.router();
    (engine, transport, router)
}

async fn post(router: &Router, path: &str, session: Option<&str>, body: Value) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let session = response
        .headers()
        .get(SESSION_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, session, value)
}

async fn negotiate(router: &Router) -> String {
    let (status, session, body) = post(router, "/mcp/negotiate", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "negotiate_response");
    session.expect("negotiate returns a session header")
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tool_without_session_is_401() {
    let (transport, router) = app();
    let (status, _, body) = post(
        &router,
        "/mcp/tool",
        None,
        json!({"tool_name": "echo", "call_id": "x"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["type"], "error");
    assert_eq!(body["error"]["code"], "invalid_session");
    assert_eq!(body["call_id"], "x");
    assert_eq!(transport.session_count().await, 0);
}

#[tokio::test]
async fn test_unknown_session_header_is_401() {
    let (_, router) = app();
    for path in ["/mcp/tool", "/mcp/resource", "/mcp/prompt"] {
        let (status, _, body) = post(&router, path, Some("not-a-session"), json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body["error"]["code"], "invalid_session");
    }
}

#[tokio::test]
async fn test_negotiate_creates_session_then_tool_call() {
    let (transport, router) = app();
    let session = negotiate(&router).await;
    assert_eq!(transport.session_count().await, 1);

    let (status, echoed, body) = post(
        &router,
        "/mcp/tool",
        Some(&session),
        json!({"tool_name": "echo", "tool_args": {"a": 1}, "call_id": "c1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed.as_deref(), Some(session.as_str()));
    assert_eq!(body["type"], "tool_response");
    assert_eq!(body["call_id"], "c1");
    assert_eq!(body["result"], json!({"a": 1}));
}

#[tokio::test]
async fn test_negotiate_reuses_known_session() {
    let (transport, router) = app();
    let session = negotiate(&router).await;

    let (_, again, _) = post(&router, "/mcp/negotiate", Some(&session), json!({})).await;
    assert_eq!(again.as_deref(), Some(session.as_str()));

    let (_, fresh, _) = post(&router, "/mcp/negotiate", Some("stale-id"), json!({})).await;
    assert_ne!(fresh.as_deref(), Some("stale-id"));
    assert_eq!(transport.session_count().await, 2);
}

#[tokio::test]
async fn test_shared_session_before_negotiate_is_not_negotiated() {
    let (engine, transport, router) = app_with_engine();
    // Created in the shared store by another transport, never negotiated.
    let session = engine.sessions().create().await.id().clone();

    let (status, echoed, body) = post(
        &router,
        "/mcp/prompt",
        Some(session.as_str()),
        json!({"prompt_name": "greeting", "call_id": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed.as_deref(), Some(session.as_str()));
    assert_eq!(body["error"]["code"], "session_not_negotiated");
    assert_eq!(body["call_id"], 3);
    assert_eq!(transport.session_count().await, 0);
}

#[tokio::test]
async fn test_prompt_route() {
    let (_, router) = app();
    let session = negotiate(&router).await;

    let (status, _, body) = post(
        &router,
        "/mcp/prompt",
        Some(&session),
        json!({"prompt_name": "greeting", "call_id": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prompt"]["content"], "Hello there!");
    assert_eq!(body["call_id"], 3);
}

#[tokio::test]
async fn test_resource_route() {
    let (_, router) = app();
    let session = negotiate(&router).await;

    let (status, _, body) = post(
        &router,
        "/mcp/resource",
        Some(&session),
        json!({"resource_uri": "memo://today"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resources"][0]["uri"], "memo://today");
}

#[tokio::test]
async fn test_malformed_bodies() {
    let (_, router) = app();
    let session = negotiate(&router).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp/tool")
        .header(SESSION_HEADER, &session)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_message");

    let (status, _, body) = post(&router, "/mcp/tool", Some(&session), json!({"call_id": "m"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_message");
    assert_eq!(body["call_id"], "m");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp/negotiate")
        .body(Body::from("[]"))
        .unwrap();
    let (status, session, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(session.is_none());
    assert_eq!(body["error"]["code"], "negotiate_error");
}

#[tokio::test]
async fn test_delete_session() {
    let (transport, router) = app();
    let session = negotiate(&router).await;

    let delete = |id: String| {
        Request::builder()
            .method(Method::DELETE)
            .uri("/mcp/session")
            .header(SESSION_HEADER, id)
            .body(Body::empty())
            .unwrap()
    };

    let (status, _, _) = send(&router, delete(session.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(transport.session_count().await, 0);

    let (status, _, body) = send(&router, delete(session.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_session");

    let (status, _, _) = post(&router, "/mcp/tool", Some(&session), json!({"tool_name": "echo"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_close_sessions_empties_store() {
    let (transport, router) = app();
    negotiate(&router).await;
    negotiate(&router).await;

    transport.close_sessions().await;
    assert_eq!(transport.session_count().await, 0);
}

#[tokio::test]
async fn test_health_and_status() {
    let (_, router) = app();
    negotiate(&router).await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    let request = Request::builder().uri("/api/status").body(Body::empty()).unwrap();
    let (_, _, body) = send(&router, request).await;
    assert_eq!(body["running"], true);
    assert_eq!(body["transports"], json!(["http"]));
    assert_eq!(body["sessions"], 1);
}

#[tokio::test]
async fn test_events_stream_is_sse() {
    let (_, router) = app();
    let request = Request::builder().uri("/mcp/events").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
}

#[tokio::test]
async fn test_cors_exposes_session_header() {
    let (_, router) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp/negotiate")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::from("{}"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let exposed = response
        .headers()
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains(SESSION_HEADER));
}
