//! Stress: high call volume, rapid session churn and full server lifecycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use vibe_mcp::config::ServerConfig;
use vibe_mcp::logging::LogBuffer;
use vibe_mcp::types::CallId;
use vibe_mcp::{McpServer, ProtocolEngine, SessionId};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_server(config: ServerConfig) -> McpServer {
    McpServer::from_config(config, LogBuffer::new(256)).expect("server builds")
}

async fn negotiated(engine: &ProtocolEngine) -> SessionId {
    let id = engine.sessions().create().await.id().clone();
    let response = engine.handle_raw(r#"{"type":"negotiate"}"#, &id).await;
    assert!(!response.is_error());
    id
}

async fn tool(engine: &ProtocolEngine, id: &SessionId, call_id: &str, name: &str, args: serde_json::Value) -> vibe_mcp::types::Response {
    let raw = json!({"type": "tool_call", "tool_name": name, "tool_args": args, "call_id": call_id}).to_string();
    engine.handle_raw(&raw, id).await
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// Hundreds of concurrent calls on one session each get their own reply.
#[tokio::test]
async fn test_many_calls_one_session() {
    let server = create_server(ServerConfig::default());
    let engine = server.engine().clone();
    let id = negotiated(&engine).await;

    let response = tool(&engine, &id, "setup", "manage_project", json!({"action": "create", "name": "load"})).await;
    assert!(!response.is_error());
    tool(&engine, &id, "switch", "manage_project", json!({"action": "switch", "name": "load"})).await;

    let start = Instant::now();
    let mut handles = Vec::new();
    for i in 0..300 {
        let engine = Arc::clone(&engine);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let call_id = format!("file-{i}");
            let response = tool(
                &engine,
                &id,
                &call_id,
                "manage_file",
                json!({"action": "create", "path": format!("f/{i}.txt"), "content": i.to_string()}),
            )
            .await;
            (call_id, response)
        }));
    }
    for handle in handles {
        let (call_id, response) = handle.await.unwrap();
        assert!(!response.is_error(), "{}", response.encode());
        assert_eq!(response.call_id(), Some(&CallId::from(call_id)));
    }
    let elapsed = start.elapsed();
    assert!(elapsed < Duration::from_secs(10), "300 calls took {elapsed:?}");

    let listed = tool(&engine, &id, "list", "manage_file", json!({"action": "list", "path": "f"})).await;
    let value: serde_json::Value = serde_json::from_str(&listed.encode()).unwrap();
    assert_eq!(value["result"]["files"].as_array().unwrap().len(), 300);
}

/// Rapid create, negotiate and remove cycles leave the store empty.
#[tokio::test]
async fn test_session_churn() {
    let server = create_server(ServerConfig::default());
    let engine = server.engine().clone();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            for _ in 0..50 {
                let id = negotiated(&engine).await;
                let response = tool(&engine, &id, "s", "manage_tunnel", json!({"action": "status"})).await;
                assert!(!response.is_error());
                assert!(engine.sessions().remove(&id).await.is_some());
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert!(engine.sessions().is_empty().await);
}

/// Conflicting writers to one config key never corrupt the view.
#[tokio::test]
async fn test_concurrent_config_writes() {
    let server = create_server(ServerConfig::default());
    let engine = server.engine().clone();
    let id = negotiated(&engine).await;

    let mut handles = Vec::new();
    for port in 4000..4050u16 {
        let engine = Arc::clone(&engine);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            tool(&engine, &id, "set", "manage_config", json!({"action": "set", "key": "server.port", "value": port})).await
        }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().is_error());
    }

    let got = tool(&engine, &id, "get", "manage_config", json!({"action": "get", "key": "server.port"})).await;
    let value: serde_json::Value = serde_json::from_str(&got.encode()).unwrap();
    let port = value["result"]["value"].as_u64().unwrap();
    assert!((4000..4050).contains(&port));
}

/// A running server stops on request and removes its sessions.
#[tokio::test]
async fn test_server_run_and_stop() {
    let mut config = ServerConfig::default();
    config.server.port = 0;
    config.transport.stdio = false;
    let server = Arc::new(create_server(config));

    let running = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.stop();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("server stops promptly")
        .unwrap();
    assert!(result.is_ok());
    assert!(server.engine().sessions().is_empty().await);
}

/// Binding an address already in use is a startup error.
#[tokio::test]
async fn test_bind_failure_is_fatal() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = ServerConfig::default();
    config.server.port = taken.local_addr().unwrap().port();
    config.transport.stdio = false;

    let err = create_server(config).run().await.unwrap_err();
    assert!(err.to_string().contains("Failed to bind"));
}
