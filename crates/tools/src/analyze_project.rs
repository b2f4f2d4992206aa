//! analyzeProject — summarize the workspace tree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nohandcoder_core::error::ToolError;
use nohandcoder_core::tool::{Tool, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::to_output;
use crate::workspace::Workspace;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalyzeArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStructure {
    pub total_files: usize,
    pub total_size: u64,
    pub directories: Vec<String>,
    pub files: Vec<ProjectFile>,
}

#[derive(Debug, Serialize)]
pub struct ProjectFile {
    pub path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

pub struct AnalyzeProjectTool {
    workspace: Arc<Workspace>,
}

impl AnalyzeProjectTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub async fn analyze(&self) -> Result<ProjectStructure, ToolError> {
        let walk = self.workspace.walk().await?;
        let files: Vec<ProjectFile> = walk
            .files
            .into_iter()
            .map(|f| ProjectFile {
                path: f.relative,
                size: f.size,
                modified: f.modified,
            })
            .collect();

        Ok(ProjectStructure {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            directories: walk.directories,
            files,
        })
    }
}

#[async_trait]
impl Tool for AnalyzeProjectTool {
    fn name(&self) -> &str {
        "analyzeProject"
    }

    fn description(&self) -> &str {
        "Analyze the project structure: every file with its size and modification time, every directory, and totals. Hidden and dependency directories are skipped."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        // Models sometimes send `null` for a no-argument call
        let arguments = if arguments.is_null() {
            serde_json::json!({})
        } else {
            arguments
        };
        let _: AnalyzeArgs = parse_arguments(arguments)?;
        to_output(self.name(), self.analyze().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summarizes_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::write(root.join("Cargo.toml"), "[package]\n").unwrap();
        std::fs::write(root.join("src/lib.rs"), "pub mod a;\n").unwrap();
        std::fs::write(root.join(".git/objects/pack"), "xxxxxxxx").unwrap();

        let tool = AnalyzeProjectTool::new(Arc::new(Workspace::new(root)));
        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert_eq!(result["totalFiles"], 2);
        assert_eq!(result["totalSize"], 10 + 11);
        assert_eq!(result["directories"], serde_json::json!(["src"]));
        assert_eq!(result["files"][0]["path"], "Cargo.toml");
        assert_eq!(result["files"][1]["path"], "src/lib.rs");
        assert!(result["files"][1]["modified"].is_string());
    }

    #[tokio::test]
    async fn empty_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let tool = AnalyzeProjectTool::new(Arc::new(Workspace::new(dir.path())));
        let structure = tool.analyze().await.unwrap();
        assert_eq!(structure.total_files, 0);
        assert_eq!(structure.total_size, 0);
        assert!(structure.directories.is_empty());
    }

    #[tokio::test]
    async fn null_arguments_accepted_extra_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tool = AnalyzeProjectTool::new(Arc::new(Workspace::new(dir.path())));
        assert!(tool.execute(serde_json::Value::Null).await.is_ok());

        let err = tool
            .execute(serde_json::json!({ "depth": 3 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
