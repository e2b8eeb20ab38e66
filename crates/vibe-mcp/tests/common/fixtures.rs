//! Shared fixtures for the server integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use vibe_mcp::config::ServerConfig;
use vibe_mcp::logging::LogBuffer;
use vibe_mcp::prompts::PromptTemplate;
use vibe_mcp::resources::ResourceHandler;
use vibe_mcp::services::Services;
use vibe_mcp::session::SessionContext;
use vibe_mcp::tools::ToolHandler;
use vibe_mcp::types::{
    McpError, McpResult, ResourceDescriptor, ResourceSchemeDefinition, ToolDefinition,
};
use vibe_mcp::{CapabilityRegistry, ProtocolEngine, SessionId, SessionStore};

/// Engine over the built-in capabilities and a fresh store.
pub fn builtin_engine() -> Arc<ProtocolEngine> {
    let config = ServerConfig::default();
    let services = Services::from_config(&config, LogBuffer::new(64)).expect("services");
    let registry = CapabilityRegistry::from_config(&config.capabilities, &services);
    Arc::new(ProtocolEngine::new(
        Arc::new(registry),
        Arc::new(SessionStore::new()),
    ))
}

/// Engine over the test doubles below.
pub fn test_engine() -> Arc<ProtocolEngine> {
    let registry = CapabilityRegistry::builder()
        .tool(Arc::new(EchoTool))
        .tool(Arc::new(SleepTool))
        .tool(Arc::new(FailingTool))
        .tool(Arc::new(PanickingTool))
        .tool(Arc::new(CounterTool))
        .resource(Arc::new(MemoResource))
        .prompt(PromptTemplate::new("greeting", "Say hello", "Hello there!"))
        .build();
    Arc::new(ProtocolEngine::new(
        Arc::new(registry),
        Arc::new(SessionStore::new()),
    ))
}

/// Create a session and negotiate it.
pub async fn ready_session(engine: &ProtocolEngine) -> SessionId {
    let id = engine.sessions().create().await.id().clone();
    let response = engine
        .handle_raw(r#"{"type":"negotiate","client_capabilities":{}}"#, &id)
        .await;
    assert!(!response.is_error(), "negotiate failed: {}", response.encode());
    id
}

/// Encode a response and parse it back as JSON for shape assertions.
pub fn wire(response: &vibe_mcp::types::Response) -> Value {
    serde_json::from_str(&response.encode()).expect("response is valid JSON")
}

/// Returns its arguments.
pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "echo".to_string(),
            description: Some("Return the arguments".to_string()),
            input_schema: json!({"type": "object"}),
        }
    }

    async fn execute(&self, args: Value, _context: &SessionContext) -> McpResult<Value> {
        Ok(args)
    }
}

/// Sleeps for `ms` milliseconds, then returns `{"slept": ms}`.
pub struct SleepTool;

#[async_trait]
impl ToolHandler for SleepTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "sleep".to_string(),
            description: None,
            input_schema: json!({"type": "object", "properties": {"ms": {"type": "integer"}}}),
        }
    }

    async fn execute(&self, args: Value, _context: &SessionContext) -> McpResult<Value> {
        let ms = args["ms"].as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(json!({ "slept": ms }))
    }
}

/// Always fails.
pub struct FailingTool;

#[async_trait]
impl ToolHandler for FailingTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "fail".to_string(),
            description: None,
            input_schema: json!({"type": "object"}),
        }
    }

    async fn execute(&self, _args: Value, _context: &SessionContext) -> McpResult<Value> {
        Err(McpError::ToolExecution("disk on fire".to_string()))
    }
}

/// Always panics.
pub struct PanickingTool;

#[async_trait]
impl ToolHandler for PanickingTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "panic".to_string(),
            description: None,
            input_schema: json!({"type": "object"}),
        }
    }

    async fn execute(&self, _args: Value, _context: &SessionContext) -> McpResult<Value> {
        panic!("handler exploded");
    }
}

/// Increments `count` in the session context and returns the new value.
pub struct CounterTool;

#[async_trait]
impl ToolHandler for CounterTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "count".to_string(),
            description: None,
            input_schema: json!({"type": "object"}),
        }
    }

    async fn execute(&self, _args: Value, context: &SessionContext) -> McpResult<Value> {
        let next = context.get("count").await.and_then(|v| v.as_u64()).unwrap_or(0) + 1;
        context.set("count", json!(next)).await;
        Ok(json!(next))
    }
}

/// `memo://<anything>` returns a fixed descriptor; `memo://broken` fails.
pub struct MemoResource;

#[async_trait]
impl ResourceHandler for MemoResource {
    fn definition(&self) -> ResourceSchemeDefinition {
        ResourceSchemeDefinition {
            protocol: "memo".to_string(),
            description: None,
            uri_template: None,
        }
    }

    async fn fetch(&self, uri: &Url, _context: &SessionContext) -> McpResult<ResourceDescriptor> {
        if uri.host_str() == Some("broken") {
            return Err(McpError::ResourceFetch("memo store unavailable".to_string()));
        }
        Ok(ResourceDescriptor {
            uri: uri.to_string(),
            mime_type: "text/plain".to_string(),
            title: "Memo".to_string(),
            content: "remember the milk".to_string(),
        })
    }
}
