//! `manage_project` tool: create, list, switch and delete projects.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::ProjectStore;
use crate::session::{context_keys, SessionContext};
use crate::types::{McpError, McpResult, ToolDefinition};

use super::ToolHandler;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ProjectAction {
    Create {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
    List,
    Switch {
        name: String,
    },
    Delete {
        name: String,
    },
}

/// Handler for `manage_project`.
pub struct ManageProject {
    projects: Arc<ProjectStore>,
}

impl ManageProject {
    /// Create the handler over a shared project catalog.
    pub fn new(projects: Arc<ProjectStore>) -> Self {
        Self { projects }
    }
}

#[async_trait]
impl ToolHandler for ManageProject {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "manage_project".to_string(),
            description: Some("Create, list, switch between and delete projects".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["create", "list", "switch", "delete"] },
                    "name": { "type": "string", "description": "Project name" },
                    "description": { "type": "string", "description": "Project description (create only)" }
                },
                "required": ["action"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &SessionContext) -> McpResult<Value> {
        let action: ProjectAction =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        match action {
            ProjectAction::Create { name, description } => {
                let project = self.projects.create(&name, description).await?;
                Ok(json!({ "project": project }))
            }
            ProjectAction::List => {
                let projects = self.projects.list().await;
                let current = context.get_str(context_keys::CURRENT_PROJECT).await;
                Ok(json!({ "projects": projects, "current": current }))
            }
            ProjectAction::Switch { name } => {
                let project = self.projects.get(&name).await?;
                context
                    .set(context_keys::CURRENT_PROJECT, Value::String(project.name.clone()))
                    .await;
                tracing::debug!(project = %project.name, "Switched current project");
                Ok(json!({ "current": project.name, "project": project }))
            }
            ProjectAction::Delete { name } => {
                self.projects.delete(&name).await?;
                let was_current =
                    context.get_str(context_keys::CURRENT_PROJECT).await.as_deref() == Some(name.as_str());
                if was_current {
                    context.remove(context_keys::CURRENT_PROJECT).await;
                }
                Ok(json!({ "deleted": name, "clearedCurrent": was_current }))
            }
        }
    }
}

/// Current project from the session context, or an error if none is selected.
pub(crate) async fn require_current_project(context: &SessionContext) -> McpResult<String> {
    context
        .get_str(context_keys::CURRENT_PROJECT)
        .await
        .ok_or_else(|| {
            McpError::InvalidParams(
                "No project selected; use manage_project with action 'switch' first".to_string(),
            )
        })
}
