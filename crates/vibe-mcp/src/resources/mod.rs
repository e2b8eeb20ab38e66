//! Resource scheme handlers and the built-in scheme set.

pub mod config;
pub mod logs;
pub mod project;
pub mod registry;

use std::sync::Arc;

pub use registry::{ResourceHandler, ResourceRegistry};

use crate::services::Services;

/// Every built-in resource scheme, in advertisement order.
pub fn builtin(services: &Services) -> Vec<Arc<dyn ResourceHandler>> {
    vec![
        Arc::new(project::ProjectResource::new(services.projects.clone())),
        Arc::new(logs::LogsResource::new(services.logs.clone())),
        Arc::new(config::ConfigResource::new(services.config.clone())),
    ]
}
