//! editFile — write or create a file, replacing its contents.

use async_trait::async_trait;
use nohandcoder_core::error::ToolError;
use nohandcoder_core::tool::{Tool, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::to_output;
use crate::workspace::Workspace;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EditFileArgs {
    file_path: String,
    content: String,
}

#[derive(Debug, Serialize)]
pub struct EditOutcome {
    pub success: bool,
    pub message: String,
    pub file: String,
}

pub struct EditFileTool {
    workspace: Arc<Workspace>,
}

impl EditFileTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "editFile"
    }

    fn description(&self) -> &str {
        "Write new contents to a file. Creates the file (and missing parent directories) if it doesn't exist, overwrites it if it does."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the file to edit (relative to the workspace root)"
                },
                "content": {
                    "type": "string",
                    "description": "The new content to write to the file"
                }
            },
            "required": ["filePath", "content"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: EditFileArgs = parse_arguments(arguments)?;
        let full_path = self.workspace.resolve(&args.file_path);

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io(parent.display().to_string(), e))?;
        }

        tokio::fs::write(&full_path, &args.content)
            .await
            .map_err(|e| ToolError::io(&args.file_path, e))?;

        debug!(file = %args.file_path, bytes = args.content.len(), "File written");

        to_output(
            self.name(),
            EditOutcome {
                success: true,
                message: format!("File {} updated successfully", args.file_path),
                file: args.file_path,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_in(dir: &tempfile::TempDir) -> EditFileTool {
        EditFileTool::new(Arc::new(Workspace::new(dir.path())))
    }

    #[test]
    fn tool_definition() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool_in(&dir);
        assert_eq!(tool.name(), "editFile");
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], serde_json::json!(["filePath", "content"]));
    }

    #[tokio::test]
    async fn write_and_verify() {
        let dir = tempfile::tempdir().unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({
                "filePath": "output.txt",
                "content": "Hello from test!"
            }))
            .await
            .unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["file"], "output.txt");
        assert_eq!(result["message"], "File output.txt updated successfully");

        let content = std::fs::read_to_string(dir.path().join("output.txt")).unwrap();
        assert_eq!(content, "Hello from test!");
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();

        tool_in(&dir)
            .execute(serde_json::json!({
                "filePath": "nested/dir/file.txt",
                "content": "nested content"
            }))
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("nested/dir/file.txt")).unwrap();
        assert_eq!(content, "nested content");
    }

    #[tokio::test]
    async fn overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("overwrite.txt");
        std::fs::write(&file_path, "old content").unwrap();

        tool_in(&dir)
            .execute(serde_json::json!({
                "filePath": file_path.to_str().unwrap(),
                "content": "new content"
            }))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[tokio::test]
    async fn missing_content_argument() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool_in(&dir)
            .execute(serde_json::json!({ "filePath": "a.txt" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
