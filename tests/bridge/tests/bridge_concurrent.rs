//! Concurrent access: several clients on different transports sharing one server.
//!
//! Tests verify that sessions created by one transport are visible in the
//! shared store, that project state is global while session context is not,
//! and that many clients negotiating at once do not interfere.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::sync::Barrier;
use tower::ServiceExt;

use vibe_mcp::config::ServerConfig;
use vibe_mcp::logging::LogBuffer;
use vibe_mcp::transport::{shutdown_channel, StdioTransport, SESSION_HEADER};
use vibe_mcp::{McpServer, SessionId};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_server() -> McpServer {
    McpServer::from_config(ServerConfig::default(), LogBuffer::new(128)).expect("server builds")
}

async fn post(router: &Router, path: &str, session: Option<&str>, body: Value) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(path);
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let session = response
        .headers()
        .get(SESSION_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, session, serde_json::from_slice(&bytes).unwrap())
}

async fn http_negotiate(router: &Router) -> String {
    let (status, session, _) = post(router, "/mcp/negotiate", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    session.expect("session header")
}

async fn http_tool(router: &Router, session: &str, tool: &str, args: Value) -> Value {
    let (_, _, body) = post(
        router,
        "/mcp/tool",
        Some(session),
        json!({"tool_name": tool, "tool_args": args, "call_id": tool}),
    )
    .await;
    body
}

/// Run newline-delimited `lines` through a stdio transport on `server`.
async fn stdio_exchange(server: &McpServer, lines: &[Value]) -> Vec<Value> {
    let input: String = lines.iter().map(|l| format!("{l}\n")).collect();
    let (mut output, writer) = tokio::io::duplex(64 * 1024);
    let (_trigger, signal) = shutdown_channel();

    StdioTransport::with_io(server.engine().clone(), input.as_bytes(), writer)
        .run(signal)
        .await
        .unwrap();

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// A session negotiated over HTTP can be driven directly through the engine.
#[tokio::test]
async fn test_http_session_is_shared_with_engine() {
    let server = create_server();
    let (router, _) = server.router();
    let session = http_negotiate(&router).await;

    http_tool(&router, &session, "manage_project", json!({"action": "create", "name": "shared"})).await;
    http_tool(&router, &session, "manage_project", json!({"action": "switch", "name": "shared"})).await;

    let id = SessionId::from(session.as_str());
    let raw = json!({
        "type": "tool_call",
        "tool_name": "manage_file",
        "tool_args": {"action": "create", "path": "notes.md", "content": "hello"},
        "call_id": "direct",
    })
    .to_string();
    let response = server.engine().handle_raw(&raw, &id).await;
    assert!(!response.is_error(), "{}", response.encode());

    let listed = http_tool(&router, &session, "manage_file", json!({"action": "list"})).await;
    assert_eq!(listed["result"]["files"][0]["path"], "notes.md");
}

/// Projects created over stdio are visible to HTTP clients.
#[tokio::test]
async fn test_projects_visible_across_transports() {
    let server = create_server();
    let (router, _) = server.router();

    let replies = stdio_exchange(
        &server,
        &[
            json!({"type": "negotiate"}),
            json!({
                "type": "tool_call",
                "tool_name": "manage_project",
                "tool_args": {"action": "create", "name": "from-stdio"},
                "call_id": 1,
            }),
        ],
    )
    .await;
    assert_eq!(replies[1]["status"], "success");
    // The stdio session is gone once its input ends.
    assert!(server.engine().sessions().is_empty().await);

    let session = http_negotiate(&router).await;
    let listed = http_tool(&router, &session, "manage_project", json!({"action": "list"})).await;
    assert_eq!(listed["result"]["projects"][0]["name"], "from-stdio");
    assert_eq!(listed["result"]["current"], Value::Null);
}

/// Many HTTP clients negotiating and selecting projects at once.
#[tokio::test]
async fn test_concurrent_http_sessions() {
    let server = create_server();
    let (router, http) = server.router();
    let http = http.expect("http transport enabled by default");

    let clients = 24;
    let barrier = Arc::new(Barrier::new(clients));
    let mut handles = Vec::new();
    for i in 0..clients {
        let router = router.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let session = http_negotiate(&router).await;
            let name = format!("project-{i}");
            http_tool(&router, &session, "manage_project", json!({"action": "create", "name": name})).await;
            let switched =
                http_tool(&router, &session, "manage_project", json!({"action": "switch", "name": name})).await;
            assert_eq!(switched["result"]["current"], name);
            (session, name)
        }));
    }

    let mut sessions = Vec::new();
    for handle in handles {
        sessions.push(handle.await.unwrap());
    }
    assert_eq!(http.session_count().await, clients);

    // Each session still sees its own selection.
    for (session, name) in &sessions {
        let listed = http_tool(&router, session, "manage_project", json!({"action": "list"})).await;
        assert_eq!(listed["result"]["current"], name.as_str());
        assert_eq!(listed["result"]["projects"].as_array().unwrap().len(), clients);
    }

    http.close_sessions().await;
    assert!(server.engine().sessions().is_empty().await);
}

/// Closing one session does not affect its neighbours.
#[tokio::test]
async fn test_close_one_session_keeps_others() {
    let server = create_server();
    let (router, _) = server.router();
    let keep = http_negotiate(&router).await;
    let drop = http_negotiate(&router).await;

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/mcp/session")
        .header(SESSION_HEADER, &drop)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let alive = http_tool(&router, &keep, "manage_tunnel", json!({"action": "status"})).await;
    assert_eq!(alive["type"], "tool_response");

    let (status, _, gone) = post(
        &router,
        "/mcp/tool",
        Some(&drop),
        json!({"tool_name": "manage_tunnel", "tool_args": {"action": "status"}}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(gone["error"]["code"], "invalid_session");
}
