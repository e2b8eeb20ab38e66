//! `manage_file` tool: file operations inside the current project.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::{LineRange, ProjectStore};
use crate::session::SessionContext;
use crate::types::{McpError, McpResult, ToolDefinition};

use super::manage_project::require_current_project;
use super::ToolHandler;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum FileAction {
    Create {
        path: String,
        #[serde(default)]
        content: String,
    },
    Read {
        path: String,
    },
    Update {
        path: String,
        content: String,
        #[serde(default, rename = "startLine")]
        start_line: Option<usize>,
        #[serde(default, rename = "endLine")]
        end_line: Option<usize>,
    },
    Delete {
        path: String,
    },
    List {
        #[serde(default)]
        path: Option<String>,
    },
}

/// Handler for `manage_file`.
pub struct ManageFile {
    projects: Arc<ProjectStore>,
}

impl ManageFile {
    /// Create the handler over a shared project catalog.
    pub fn new(projects: Arc<ProjectStore>) -> Self {
        Self { projects }
    }
}

fn line_range(start: Option<usize>, end: Option<usize>) -> McpResult<Option<LineRange>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), end) => Ok(Some(LineRange {
            start,
            end: end.unwrap_or(start),
        })),
        (None, Some(_)) => Err(McpError::InvalidParams(
            "'endLine' requires 'startLine'".to_string(),
        )),
    }
}

#[async_trait]
impl ToolHandler for ManageFile {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "manage_file".to_string(),
            description: Some("Create, read, update, delete and list files in the current project".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["create", "read", "update", "delete", "list"] },
                    "path": { "type": "string", "description": "Project-relative file or directory path" },
                    "content": { "type": "string", "description": "File content (create, update)" },
                    "startLine": { "type": "integer", "minimum": 1, "description": "First line to replace (update)" },
                    "endLine": { "type": "integer", "minimum": 1, "description": "Last line to replace (update)" }
                },
                "required": ["action"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &SessionContext) -> McpResult<Value> {
        let action: FileAction =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
        let project = require_current_project(context).await?;

        match action {
            FileAction::Create { path, content } => {
                let file = self.projects.create_file(&project, &path, content).await?;
                Ok(json!({ "project": project, "file": file }))
            }
            FileAction::Read { path } => {
                let file = self.projects.read_file(&project, &path).await?;
                Ok(json!({ "project": project, "file": file }))
            }
            FileAction::Update {
                path,
                content,
                start_line,
                end_line,
            } => {
                let range = line_range(start_line, end_line)?;
                let file = self
                    .projects
                    .update_file(&project, &path, &content, range)
                    .await?;
                Ok(json!({ "project": project, "file": file }))
            }
            FileAction::Delete { path } => {
                self.projects.delete_file(&project, &path).await?;
                Ok(json!({ "project": project, "deleted": path }))
            }
            FileAction::List { path } => {
                let files = self.projects.list_files(&project, path.as_deref()).await?;
                Ok(json!({ "project": project, "files": files }))
            }
        }
    }
}
