//! Resource handler for `project://<project>/<path>`: file content, or the
//! project summary when no path is given.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use crate::services::ProjectStore;
use crate::session::SessionContext;
use crate::types::{McpError, McpResult, ResourceDescriptor, ResourceSchemeDefinition};

use super::registry::parts;
use super::ResourceHandler;

/// Handler for the `project` scheme.
pub struct ProjectResource {
    projects: Arc<ProjectStore>,
}

impl ProjectResource {
    /// Create the handler over a shared project catalog.
    pub fn new(projects: Arc<ProjectStore>) -> Self {
        Self { projects }
    }
}

fn mime_for(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("json") => "application/json",
        Some("md") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js" | "mjs") => "text/javascript",
        Some("toml") => "application/toml",
        Some("yaml" | "yml") => "application/yaml",
        _ => "text/plain",
    }
}

#[async_trait]
impl ResourceHandler for ProjectResource {
    fn definition(&self) -> ResourceSchemeDefinition {
        ResourceSchemeDefinition {
            protocol: "project".to_string(),
            description: Some("Project files and summaries".to_string()),
            uri_template: Some("project://{project}/{path}".to_string()),
        }
    }

    async fn fetch(&self, uri: &Url, _context: &SessionContext) -> McpResult<ResourceDescriptor> {
        let parts = parts(uri);
        let (project, rest) = parts
            .split_first()
            .ok_or_else(|| McpError::ResourceFetch(format!("Missing project name in {uri}")))?;
        let project = *project;
        let path = rest.join("/");

        if path.is_empty() {
            let summary = self.projects.get(project).await?;
            let files = self.projects.list_files(project, None).await?;
            let content = serde_json::to_string_pretty(&json!({
                "project": summary,
                "files": files,
            }))?;
            return Ok(ResourceDescriptor {
                uri: uri.to_string(),
                mime_type: "application/json".to_string(),
                title: format!("Project {project}"),
                content,
            });
        }

        let file = self.projects.read_file(project, &path).await?;
        Ok(ResourceDescriptor {
            uri: uri.to_string(),
            mime_type: mime_for(&file.path).to_string(),
            title: format!("{project}/{}", file.path),
            content: file.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_and_summary() {
        let projects = Arc::new(ProjectStore::new());
        projects.create("demo", Some("test".into())).await.unwrap();
        projects
            .create_file("demo", "docs/readme.md", "# hi".into())
            .await
            .unwrap();
        let handler = ProjectResource::new(projects);
        let context = SessionContext::new();

        let file = handler
            .fetch(&Url::parse("project://demo/docs/readme.md").unwrap(), &context)
            .await
            .unwrap();
        assert_eq!(file.content, "# hi");
        assert_eq!(file.mime_type, "text/markdown");

        let summary = handler
            .fetch(&Url::parse("project://demo").unwrap(), &context)
            .await
            .unwrap();
        assert_eq!(summary.mime_type, "application/json");
        assert!(summary.content.contains("docs/readme.md"));
    }

    #[tokio::test]
    async fn missing_project_fails() {
        let handler = ProjectResource::new(Arc::new(ProjectStore::new()));
        assert!(handler
            .fetch(&Url::parse("project://ghost/a.txt").unwrap(), &SessionContext::new())
            .await
            .is_err());
    }
}
