//! Authoritative session table shared by every transport.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::state::{Session, SessionId};

/// Maps session ids to sessions. Safe for concurrent use from any number of
/// transports and connections.
///
/// Entries are never evicted implicitly; the owning transport removes them.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session in the `NEGOTIATING` state with a fresh id.
    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new());
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session.clone());
        tracing::debug!(session_id = %session.id(), "Session created");
        session
    }

    /// Look up a session.
    pub async fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Whether a session exists.
    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Remove a session and mark it closed.
    ///
    /// Does not wait for in-flight calls on that session; they keep their own
    /// handle and finish against a closed session.
    pub async fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        let removed = self.sessions.write().await.remove(id);
        if let Some(session) = &removed {
            session.mark_closed().await;
            tracing::debug!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Ids of all live sessions.
    pub async fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().cloned().collect()
    }
}
