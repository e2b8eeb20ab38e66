//! `exec_command` tool: run a shell command for the current project.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;

use crate::session::{context_keys, SessionContext};
use crate::types::{McpError, McpResult, ToolDefinition};

use super::manage_project::require_current_project;
use super::ToolHandler;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecParams {
    command: String,
    #[serde(default)]
    working_dir: Option<String>,
}

/// Handler for `exec_command`.
pub struct ExecCommand {
    timeout: Duration,
}

impl ExecCommand {
    /// Create the handler with the per-command timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn shell(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

async fn working_dir(requested: Option<String>, context: &SessionContext) -> McpResult<PathBuf> {
    let dir = match requested {
        Some(dir) => PathBuf::from(dir),
        None => match context.get_str(context_keys::WORKING_DIRECTORY).await {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        },
    };
    match tokio::fs::metadata(&dir).await {
        Ok(meta) if meta.is_dir() => Ok(dir),
        _ => Err(McpError::InvalidParams(format!(
            "Working directory does not exist: {}",
            dir.display()
        ))),
    }
}

#[async_trait]
impl ToolHandler for ExecCommand {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "exec_command".to_string(),
            description: Some("Execute a shell command in the context of the current project".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "Command line passed to the platform shell" },
                    "workingDir": { "type": "string", "description": "Directory to run in" }
                },
                "required": ["command"]
            }),
        }
    }

    async fn execute(&self, args: Value, context: &SessionContext) -> McpResult<Value> {
        let params: ExecParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
        if params.command.trim().is_empty() {
            return Err(McpError::InvalidParams("'command' must not be empty".to_string()));
        }
        let project = require_current_project(context).await?;
        let dir = working_dir(params.working_dir, context).await?;

        tracing::info!(project = %project, command = %params.command, "Executing command");
        let mut cmd = shell(&params.command);
        cmd.current_dir(&dir).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                McpError::ToolExecution(format!(
                    "Command timed out after {}s: {}",
                    self.timeout.as_secs(),
                    params.command
                ))
            })??;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        Ok(json!({
            "command": params.command,
            "workingDir": dir.display().to_string(),
            "output": text,
            "exitCode": output.status.code(),
        }))
    }
}
