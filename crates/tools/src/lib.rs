//! Built-in tool implementations for NoHandCoder.
//!
//! Tools give the agent the ability to act on the workspace:
//! read and edit files, search text, analyze the project tree,
//! and run shell commands.

pub mod analyze_project;
pub mod edit_file;
pub mod execute_command;
pub mod read_file;
pub mod search_files;
pub mod workspace;

use nohandcoder_core::error::ToolError;
use nohandcoder_core::tool::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub use analyze_project::AnalyzeProjectTool;
pub use edit_file::EditFileTool;
pub use execute_command::ExecuteCommandTool;
pub use read_file::ReadFileTool;
pub use search_files::SearchFilesTool;
pub use workspace::Workspace;

/// Create the tool registry with all built-in tools scoped to `workspace`.
pub fn default_registry(workspace: Workspace, command_timeout: Duration) -> ToolRegistry {
    let workspace = Arc::new(workspace);
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ReadFileTool::new(workspace.clone())));
    registry.register(Box::new(EditFileTool::new(workspace.clone())));
    registry.register(Box::new(SearchFilesTool::new(workspace.clone())));
    registry.register(Box::new(AnalyzeProjectTool::new(workspace.clone())));
    registry.register(Box::new(
        ExecuteCommandTool::new(workspace).with_timeout(command_timeout),
    ));
    registry
}

/// Serialize a tool's typed output into the JSON the model sees.
pub(crate) fn to_output<T: Serialize>(
    tool: &str,
    value: T,
) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::ExecutionFailed {
        tool_name: tool.to_string(),
        reason: format!("unserializable output: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_tools() {
        let registry = default_registry(Workspace::new("."), Duration::from_secs(5));
        assert_eq!(
            registry.names(),
            vec![
                "analyzeProject",
                "editFile",
                "executeCommand",
                "readFile",
                "searchFiles"
            ]
        );
        for def in registry.definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert_eq!(def.parameters["additionalProperties"], false, "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }

    #[tokio::test]
    async fn registry_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(Workspace::new(dir.path()), Duration::from_secs(5));

        registry
            .execute(
                "editFile",
                serde_json::json!({ "filePath": "src/hello.txt", "content": "hi there" }),
            )
            .await
            .unwrap();

        let read = registry
            .execute("readFile", serde_json::json!({ "filePath": "src/hello.txt" }))
            .await
            .unwrap();
        assert_eq!(read["content"], "hi there");

        let found = registry
            .execute("searchFiles", serde_json::json!({ "pattern": "**/*.txt", "text": "there" }))
            .await
            .unwrap();
        assert_eq!(found[0]["file"], "src/hello.txt");
    }
}
