//! executeCommand — run a shell command in the workspace root.
//!
//! A non-zero exit is reported as data (`success: false` with the exit
//! code); only failing to spawn or running past the timeout is an error.

use async_trait::async_trait;
use nohandcoder_core::error::ToolError;
use nohandcoder_core::tool::{Tool, parse_arguments};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::to_output;
use crate::workspace::Workspace;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandArgs {
    command: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub success: bool,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub struct ExecuteCommandTool {
    workspace: Arc<Workspace>,
    timeout: Duration,
}

impl ExecuteCommandTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self {
            workspace,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(&self, command: &str) -> Result<CommandOutput, ToolError> {
        debug!(command = %command, cwd = %self.workspace.root().display(), "Executing shell command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(self.workspace.root()).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::ExecutionFailed {
                    tool_name: "executeCommand".into(),
                    reason: format!("failed to start '{command}': {e}"),
                });
            }
            Err(_) => {
                warn!(command = %command, timeout_secs = self.timeout.as_secs(), "Command timed out");
                return Err(ToolError::ExecutionFailed {
                    tool_name: "executeCommand".into(),
                    reason: format!(
                        "'{command}' timed out after {}s",
                        self.timeout.as_secs_f32()
                    ),
                });
            }
        };

        let success = output.status.success();
        if !success {
            debug!(command = %command, exit_code = ?output.status.code(), "Command exited non-zero");
        }

        Ok(CommandOutput {
            success,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "executeCommand"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace root and return its exit code, stdout and stderr."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Command to execute"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: CommandArgs = parse_arguments(arguments)?;
        to_output(self.name(), self.run(&args.command).await?)
    }
}
