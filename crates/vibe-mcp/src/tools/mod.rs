//! Tool handlers and the built-in tool set.

pub mod exec_command;
pub mod manage_config;
pub mod manage_file;
pub mod manage_project;
pub mod manage_tunnel;
pub mod registry;

use std::sync::Arc;

pub use registry::{ToolHandler, ToolRegistry};

use crate::services::Services;

/// Every built-in tool, in advertisement order.
pub fn builtin(services: &Services) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(manage_project::ManageProject::new(services.projects.clone())),
        Arc::new(manage_file::ManageFile::new(services.projects.clone())),
        Arc::new(exec_command::ExecCommand::new(services.command_timeout)),
        Arc::new(manage_tunnel::ManageTunnel::new(services.tunnel.clone())),
        Arc::new(manage_config::ManageConfig::new(services.config.clone())),
    ]
}
