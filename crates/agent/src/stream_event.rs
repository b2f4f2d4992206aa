//! Agent-level streaming events.
//!
//! `AgentStreamEvent` wraps provider-level stream chunks and tool activity
//! into higher-level events that a front end (the CLI) can render as they
//! happen.

use nohandcoder_core::provider::Usage;
use serde::{Deserialize, Serialize};

/// Events emitted by a session while a turn runs.
///
/// - `chunk`       — partial text token from the LLM
/// - `tool_call`   — the model requested a tool
/// - `tool_result` — tool execution completed
/// - `done`        — the turn produced its final answer
/// - `error`       — the turn failed; history was left as it was before it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Partial text token from the LLM.
    Chunk { content: String },

    /// The model is calling a tool. `arguments` is the raw JSON text.
    ToolCall {
        id: String,
        name: String,
        arguments: String,
    },

    /// Tool execution completed. `output` is what the model will see.
    ToolResult {
        id: String,
        name: String,
        output: String,
        success: bool,
    },

    /// The turn is complete.
    Done {
        conversation_id: String,
        usage: Option<Usage>,
        iterations: u32,
        tool_calls_made: usize,
    },

    /// The turn failed.
    Error { message: String, retryable: bool },
}

impl AgentStreamEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

/// Callback that receives events as a turn progresses.
pub type EventSink<'a> = &'a (dyn Fn(&AgentStreamEvent) + Send + Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_chunk() {
        let event = AgentStreamEvent::Chunk {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chunk""#));
        assert!(json.contains(r#""content":"Hello""#));
    }

    #[test]
    fn event_serialization_tool_call() {
        let event = AgentStreamEvent::ToolCall {
            id: "call_1".into(),
            name: "readFile".into(),
            arguments: r#"{"filePath":"Cargo.toml"}"#.into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_call""#));
        assert!(json.contains(r#""name":"readFile""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = AgentStreamEvent::Done {
            conversation_id: "abc".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            }),
            iterations: 2,
            tool_calls_made: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
        assert!(json.contains(r#""iterations":2"#));
    }

    #[test]
    fn event_type_names() {
        let cases = [
            (
                AgentStreamEvent::Chunk {
                    content: "x".into(),
                },
                "chunk",
            ),
            (
                AgentStreamEvent::ToolResult {
                    id: "a".into(),
                    name: "b".into(),
                    output: "c".into(),
                    success: true,
                },
                "tool_result",
            ),
            (
                AgentStreamEvent::Error {
                    message: "x".into(),
                    retryable: false,
                },
                "error",
            ),
        ];
        for (event, name) in cases {
            assert_eq!(event.event_type(), name);
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], name);
        }
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"error","message":"boom","retryable":true}"#;
        let event: AgentStreamEvent = serde_json::from_str(json).unwrap();
        match event {
            AgentStreamEvent::Error { message, retryable } => {
                assert_eq!(message, "boom");
                assert!(retryable);
            }
            _ => panic!("Wrong variant"),
        }
    }
}
