//! readFile — read a file's contents plus size and modification time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nohandcoder_core::error::ToolError;
use nohandcoder_core::tool::{Tool, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::to_output;
use crate::workspace::Workspace;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReadFileArgs {
    file_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// The path as the caller gave it
    pub path: String,
    pub content: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

pub struct ReadFileTool {
    workspace: Arc<Workspace>,
}

impl ReadFileTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub async fn read(&self, file_path: &str) -> Result<FileInfo, ToolError> {
        let full_path = self.workspace.resolve(file_path);
        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| ToolError::io(file_path, e))?;
        let metadata = tokio::fs::metadata(&full_path)
            .await
            .map_err(|e| ToolError::io(file_path, e))?;

        Ok(FileInfo {
            path: file_path.to_string(),
            content,
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "readFile"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. Returns the content, size in bytes and last modification time."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the file to read (relative to the workspace root)"
                }
            },
            "required": ["filePath"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: ReadFileArgs = parse_arguments(arguments)?;
        let info = self.read(&args.file_path).await?;
        to_output(self.name(), info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tool_in(dir: &tempfile::TempDir) -> ReadFileTool {
        ReadFileTool::new(Arc::new(Workspace::new(dir.path())))
    }

    #[test]
    fn tool_definition() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool_in(&dir);
        assert_eq!(tool.name(), "readFile");
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], serde_json::json!(["filePath"]));
        assert!(schema["properties"]["filePath"].is_object());
    }

    #[tokio::test]
    async fn read_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("test.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({ "filePath": "test.txt" }))
            .await
            .unwrap();

        assert_eq!(result["path"], "test.txt");
        assert_eq!(result["content"], "Hello, world!\n");
        assert_eq!(result["size"], 14);
        assert!(result["modified"].is_string());
    }

    #[tokio::test]
    async fn read_absolute_file() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let path = other.path().join("abs.txt");
        std::fs::write(&path, "outside").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({ "filePath": path.to_str().unwrap() }))
            .await
            .unwrap();
        assert_eq!(result["content"], "outside");
    }

    #[tokio::test]
    async fn read_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool_in(&dir)
            .execute(serde_json::json!({ "filePath": "missing.txt" }))
            .await
            .unwrap_err();

        match err {
            ToolError::Io { path, source } => {
                assert_eq!(path, "missing.txt");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_path_argument() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool_in(&dir).execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
