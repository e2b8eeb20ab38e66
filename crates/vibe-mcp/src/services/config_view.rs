//! Runtime JSON view of the configuration for the `manage_config` tool.
//!
//! The view starts as a copy of the loaded configuration. Writes only touch
//! the copy; the server's own [`ServerConfig`](crate::config::ServerConfig)
//! is read once at startup and never changes.

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::types::{McpError, McpResult};

/// Dotted-key view over a JSON document, with reset-to-default support.
#[derive(Debug)]
pub struct ConfigView {
    defaults: Value,
    current: RwLock<Value>,
}

impl ConfigView {
    /// Create a view from the loaded configuration and the built-in defaults.
    pub fn new(current: Value, defaults: Value) -> Self {
        Self {
            defaults,
            current: RwLock::new(current),
        }
    }

    /// The whole document.
    pub async fn snapshot(&self) -> Value {
        self.current.read().await.clone()
    }

    /// Value at a dotted key such as `server.port`.
    pub async fn get(&self, key: &str) -> Option<Value> {
        lookup(&*self.current.read().await, key).cloned()
    }

    /// Set the value at a dotted key, creating intermediate tables.
    /// Returns the previous value.
    pub async fn set(&self, key: &str, value: Value) -> McpResult<Option<Value>> {
        let parts = split_key(key)?;
        let mut current = self.current.write().await;
        let mut target = &mut *current;
        for part in &parts[..parts.len() - 1] {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            target = target
                .as_object_mut()
                .map(|object| {
                    object
                        .entry(part.to_string())
                        .or_insert_with(|| Value::Object(Map::new()))
                })
                .ok_or_else(|| McpError::InvalidParams(format!("Cannot descend into '{part}'")))?;
        }
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        let last = parts[parts.len() - 1];
        Ok(target
            .as_object_mut()
            .and_then(|object| object.insert(last.to_string(), value)))
    }

    /// Reset one key (or everything) to the built-in default.
    pub async fn reset(&self, key: Option<&str>) -> McpResult<()> {
        match key {
            None => {
                *self.current.write().await = self.defaults.clone();
                Ok(())
            }
            Some(key) => {
                let default = lookup(&self.defaults, key)
                    .cloned()
                    .ok_or_else(|| McpError::NotFound(format!("config key {key}")))?;
                self.set(key, default).await.map(|_| ())
            }
        }
    }
}

fn split_key(key: &str) -> McpResult<Vec<&str>> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(McpError::InvalidParams(format!("Invalid config key: '{key}'")));
    }
    Ok(parts)
}

/// Resolve a dotted key inside a JSON document.
pub fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |value, part| value.get(part))
}
