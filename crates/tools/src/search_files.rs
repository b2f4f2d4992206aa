//! searchFiles — literal substring search over files matching a glob.

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use nohandcoder_core::error::ToolError;
use nohandcoder_core::tool::{Tool, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use crate::to_output;
use crate::workspace::Workspace;

const MATCH_ALL: &str = "**/*";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    #[serde(default)]
    pattern: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub file: String,
    /// 1-based
    pub line: usize,
    /// The matching line, trimmed
    pub content: String,
}

pub struct SearchFilesTool {
    workspace: Arc<Workspace>,
}

impl SearchFilesTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub async fn search(&self, pattern: &str, text: &str) -> Result<Vec<SearchMatch>, ToolError> {
        if text.is_empty() {
            return Err(ToolError::InvalidArguments(
                "search text must not be empty".into(),
            ));
        }
        let matcher = compile_pattern(pattern)?;
        let walk = self.workspace.walk().await?;
        let mut matches = Vec::new();

        for entry in walk.files.iter().filter(|f| matcher.is_match(&f.relative)) {
            // Binary or unreadable files are not an error, just not searchable
            let content = match tokio::fs::read_to_string(&entry.path).await {
                Ok(content) => content,
                Err(e) => {
                    trace!(file = %entry.relative, error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            matches.extend(find_in(&entry.relative, &content, text));
        }

        Ok(matches)
    }
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher, ToolError> {
    let pattern = if pattern.trim().is_empty() {
        MATCH_ALL
    } else {
        pattern.trim()
    };
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| ToolError::InvalidArguments(format!("invalid glob '{pattern}': {e}")))
}

fn find_in(file: &str, content: &str, text: &str) -> Vec<SearchMatch> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(text))
        .map(|(idx, line)| SearchMatch {
            file: file.to_string(),
            line: idx + 1,
            content: line.trim().to_string(),
        })
        .collect()
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "searchFiles"
    }

    fn description(&self) -> &str {
        "Search for a literal text in files whose workspace-relative path matches a glob pattern. Returns file, line number and the matching line."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob pattern to match files (e.g. '**/*.rs'). Empty matches every file."
                },
                "text": {
                    "type": "string",
                    "description": "Text to search for in files"
                }
            },
            "required": ["pattern", "text"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: SearchArgs = parse_arguments(arguments)?;
        let matches = self.search(&args.pattern, &args.text).await?;
        to_output(self.name(), matches)
    }
}
