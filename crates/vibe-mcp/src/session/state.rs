//! Per-session state: lifecycle, negotiated manifest, and mutable context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::types::CapabilityManifest;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Created, waiting for `negotiate`.
    Negotiating,
    /// Negotiated; tool/resource/prompt requests are accepted.
    Ready,
    /// Removed from the store; in-flight calls may still complete.
    Closed,
}

/// Well-known context keys written by the built-in tools.
pub mod context_keys {
    /// Name of the project selected with `manage_project switch`.
    pub const CURRENT_PROJECT: &str = "current_project";
    /// Default working directory for `exec_command`.
    pub const WORKING_DIRECTORY: &str = "working_directory";
}

/// Mutable key/value state scoped to one session.
///
/// Cloning yields another handle to the same map. Each read or write is
/// serialized by the inner lock; the lock is never held across a handler's
/// own await points, so concurrent calls on one session stay independent.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    values: Arc<RwLock<Map<String, Value>>>,
}

impl SessionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.values.read().await.get(key).cloned()
    }

    /// Read a string value.
    pub async fn get_str(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .await
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Write a value, returning the previous one.
    pub async fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.write().await.insert(key.into(), value)
    }

    /// Remove a value.
    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().await.remove(key)
    }

    /// Copy of the whole map.
    pub async fn snapshot(&self) -> Map<String, Value> {
        self.values.read().await.clone()
    }
}

#[derive(Debug)]
struct Negotiation {
    state: SessionState,
    manifest: Option<Arc<CapabilityManifest>>,
    client_capabilities: Value,
    negotiated_at: Option<DateTime<Utc>>,
}

/// One client conversation. Owned by the [`SessionStore`](super::SessionStore);
/// transports keep only the [`SessionId`].
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    negotiation: Mutex<Negotiation>,
    context: SessionContext,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            id: SessionId::generate(),
            created_at: Utc::now(),
            negotiation: Mutex::new(Negotiation {
                state: SessionState::Negotiating,
                manifest: None,
                client_capabilities: Value::Null,
                negotiated_at: None,
            }),
            context: SessionContext::new(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Handle to the session's context map.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.negotiation.lock().await.state
    }

    /// Manifest fixed at the last negotiation, if any.
    pub async fn manifest(&self) -> Option<Arc<CapabilityManifest>> {
        self.negotiation.lock().await.manifest.clone()
    }

    /// Capabilities the client declared at the last negotiation.
    pub async fn client_capabilities(&self) -> Value {
        self.negotiation.lock().await.client_capabilities.clone()
    }

    /// When the session was last negotiated.
    pub async fn negotiated_at(&self) -> Option<DateTime<Utc>> {
        self.negotiation.lock().await.negotiated_at
    }

    /// The manifest, but only when the session is `READY`.
    pub async fn ready_manifest(&self) -> Option<Arc<CapabilityManifest>> {
        let negotiation = self.negotiation.lock().await;
        match negotiation.state {
            SessionState::Ready => negotiation.manifest.clone(),
            SessionState::Negotiating | SessionState::Closed => None,
        }
    }

    /// Fix the manifest and move to `READY`. Re-negotiating refreshes the
    /// manifest. Returns `false` if the session is already closed.
    pub(crate) async fn mark_ready(
        &self,
        manifest: Arc<CapabilityManifest>,
        client_capabilities: Value,
    ) -> bool {
        let mut negotiation = self.negotiation.lock().await;
        if negotiation.state == SessionState::Closed {
            return false;
        }
        negotiation.state = SessionState::Ready;
        negotiation.manifest = Some(manifest);
        negotiation.client_capabilities = client_capabilities;
        negotiation.negotiated_at = Some(Utc::now());
        true
    }

    pub(crate) async fn mark_closed(&self) {
        self.negotiation.lock().await.state = SessionState::Closed;
    }
}
