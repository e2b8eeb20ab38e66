//! In-memory project catalog with per-project files.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::types::{McpError, McpResult};

#[derive(Debug, Clone)]
struct FileEntry {
    content: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Project {
    description: Option<String>,
    created_at: DateTime<Utc>,
    files: IndexMap<String, FileEntry>,
}

/// Project metadata as reported by tools and resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project name.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Number of files in the project.
    pub file_count: usize,
}

/// File metadata as reported by tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Project-relative path.
    pub path: String,
    /// Content length in bytes.
    pub size: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

/// A file's content with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// Project-relative path.
    pub path: String,
    /// File content.
    pub content: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

/// Inclusive, 1-based line range used for partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    /// First line replaced.
    pub start: usize,
    /// Last line replaced.
    pub end: usize,
}

/// Shared catalog of projects. Safe for concurrent use by every session.
#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: RwLock<IndexMap<String, Project>>,
}

impl ProjectStore {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a project.
    pub async fn create(&self, name: &str, description: Option<String>) -> McpResult<ProjectSummary> {
        let name = validate_name(name)?;
        let mut projects = self.projects.write().await;
        if projects.contains_key(name) {
            return Err(McpError::InvalidParams(format!("Project already exists: {name}")));
        }
        let project = Project {
            description,
            created_at: Utc::now(),
            files: IndexMap::new(),
        };
        let summary = summarize(name, &project);
        projects.insert(name.to_string(), project);
        tracing::info!(project = name, "Project created");
        Ok(summary)
    }

    /// All projects, in creation order.
    pub async fn list(&self) -> Vec<ProjectSummary> {
        self.projects
            .read()
            .await
            .iter()
            .map(|(name, project)| summarize(name, project))
            .collect()
    }

    /// One project's metadata.
    pub async fn get(&self, name: &str) -> McpResult<ProjectSummary> {
        self.projects
            .read()
            .await
            .get(name)
            .map(|project| summarize(name, project))
            .ok_or_else(|| McpError::NotFound(format!("project {name}")))
    }

    /// Whether a project exists.
    pub async fn exists(&self, name: &str) -> bool {
        self.projects.read().await.contains_key(name)
    }

    /// Delete a project and all its files.
    pub async fn delete(&self, name: &str) -> McpResult<()> {
        if self.projects.write().await.shift_remove(name).is_none() {
            return Err(McpError::NotFound(format!("project {name}")));
        }
        tracing::info!(project = name, "Project deleted");
        Ok(())
    }

    /// Create a file. Fails if it already exists.
    pub async fn create_file(&self, project: &str, path: &str, content: String) -> McpResult<FileSummary> {
        let path = normalize_path(path)?;
        let mut projects = self.projects.write().await;
        let project = project_mut(&mut projects, project)?;
        if project.files.contains_key(&path) {
            return Err(McpError::InvalidParams(format!("File already exists: {path}")));
        }
        let now = Utc::now();
        let entry = FileEntry {
            content,
            created_at: now,
            modified_at: now,
        };
        let summary = file_summary(&path, &entry);
        project.files.insert(path, entry);
        Ok(summary)
    }

    /// Read a file.
    pub async fn read_file(&self, project: &str, path: &str) -> McpResult<FileContent> {
        let path = normalize_path(path)?;
        let projects = self.projects.read().await;
        let project = projects
            .get(project)
            .ok_or_else(|| McpError::NotFound(format!("project {project}")))?;
        let entry = project
            .files
            .get(&path)
            .ok_or_else(|| McpError::NotFound(format!("file {path}")))?;
        Ok(FileContent {
            path,
            content: entry.content.clone(),
            last_modified: entry.modified_at,
        })
    }

    /// Replace a file's content, or only the given line range.
    pub async fn update_file(
        &self,
        project: &str,
        path: &str,
        content: &str,
        range: Option<LineRange>,
    ) -> McpResult<FileSummary> {
        let path = normalize_path(path)?;
        let mut projects = self.projects.write().await;
        let project = project_mut(&mut projects, project)?;
        let entry = project
            .files
            .get_mut(&path)
            .ok_or_else(|| McpError::NotFound(format!("file {path}")))?;
        entry.content = match range {
            Some(range) => replace_lines(&entry.content, content, range)?,
            None => content.to_string(),
        };
        entry.modified_at = Utc::now();
        Ok(file_summary(&path, entry))
    }

    /// Delete a file.
    pub async fn delete_file(&self, project: &str, path: &str) -> McpResult<()> {
        let path = normalize_path(path)?;
        let mut projects = self.projects.write().await;
        let project = project_mut(&mut projects, project)?;
        project
            .files
            .shift_remove(&path)
            .map(|_| ())
            .ok_or_else(|| McpError::NotFound(format!("file {path}")))
    }

    /// Files under `prefix` (a directory), or every file.
    pub async fn list_files(&self, project: &str, prefix: Option<&str>) -> McpResult<Vec<FileSummary>> {
        let prefix = match prefix {
            Some(p) if !p.trim_matches('/').is_empty() => Some(normalize_path(p)?),
            _ => None,
        };
        let projects = self.projects.read().await;
        let project = projects
            .get(project)
            .ok_or_else(|| McpError::NotFound(format!("project {project}")))?;
        Ok(project
            .files
            .iter()
            .filter(|(path, _)| match &prefix {
                Some(dir) => path.strip_prefix(dir.as_str()).is_some_and(|rest| rest.starts_with('/')),
                None => true,
            })
            .map(|(path, entry)| file_summary(path, entry))
            .collect())
    }
}

fn project_mut<'a>(
    projects: &'a mut IndexMap<String, Project>,
    name: &str,
) -> McpResult<&'a mut Project> {
    projects
        .get_mut(name)
        .ok_or_else(|| McpError::NotFound(format!("project {name}")))
}

fn summarize(name: &str, project: &Project) -> ProjectSummary {
    ProjectSummary {
        name: name.to_string(),
        description: project.description.clone(),
        created_at: project.created_at,
        file_count: project.files.len(),
    }
}

fn file_summary(path: &str, entry: &FileEntry) -> FileSummary {
    FileSummary {
        path: path.to_string(),
        size: entry.content.len(),
        created_at: entry.created_at,
        last_modified: entry.modified_at,
    }
}

fn validate_name(name: &str) -> McpResult<&str> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') {
        return Err(McpError::InvalidParams(format!("Invalid project name: '{name}'")));
    }
    Ok(name)
}

/// Normalize a project-relative path. Rejects empty paths and `..` segments.
pub fn normalize_path(path: &str) -> McpResult<String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(McpError::InvalidParams(format!(
                    "Path must stay inside the project: {path}"
                )))
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(McpError::InvalidParams("'path' must not be empty".to_string()));
    }
    Ok(segments.join("/"))
}

fn replace_lines(original: &str, replacement: &str, range: LineRange) -> McpResult<String> {
    let mut lines: Vec<&str> = original.lines().collect();
    if range.start == 0 || range.end < range.start || range.start > lines.len() + 1 {
        return Err(McpError::InvalidParams(format!(
            "Invalid line range {}-{} for a file of {} lines",
            range.start,
            range.end,
            lines.len()
        )));
    }
    let end = range.end.min(lines.len());
    let start = range.start - 1;
    lines.splice(start..end.max(start), replacement.lines());
    let mut updated = lines.join("\n");
    if original.ends_with('\n') {
        updated.push('\n');
    }
    Ok(updated)
}
