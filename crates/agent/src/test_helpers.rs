//! Shared test helpers: scripted providers and small tools.

use async_trait::async_trait;
use nohandcoder_core::error::{ProviderError, ToolError};
use nohandcoder_core::message::{Message, MessageToolCall};
use nohandcoder_core::provider::{
    ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolCallDelta, Usage,
};
use nohandcoder_core::tool::{Tool, parse_arguments};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::accumulator::StreamAccumulator;

/// What the provider does on one call.
pub enum Round {
    /// Stream these chunks, then close.
    Chunks(Vec<StreamChunk>),
    /// Fail the request.
    Fail(ProviderError),
    /// Stream these chunks, then keep the stream open forever.
    Hang(Vec<StreamChunk>),
}

/// A mock provider that plays back a queue of scripted rounds.
///
/// Panics if more calls are made than rounds provided. Every request is
/// recorded so tests can inspect what the model was sent.
pub struct ScriptedProvider {
    rounds: Mutex<VecDeque<Round>>,
    requests: Mutex<Vec<ProviderRequest>>,
    held_open: Mutex<Vec<mpsc::Sender<Result<StreamChunk, ProviderError>>>>,
}

impl ScriptedProvider {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
            held_open: Mutex::new(Vec::new()),
        }
    }

    /// A provider that requests the same tool on every round, forever.
    pub fn always_tools(rounds: usize) -> Self {
        Self::new(
            (0..rounds)
                .map(|i| tool_round(&[(&format!("call_{i}"), "echo", r#"{"text":"again"}"#)]))
                .collect(),
        )
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_round(&self, request: ProviderRequest) -> Round {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        self.rounds
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no more rounds (call #{count})"))
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match self.next_round(request) {
            Round::Chunks(chunks) | Round::Hang(chunks) => {
                let mut acc = StreamAccumulator::new();
                for chunk in chunks {
                    acc.push(chunk);
                }
                let response = acc.finish();
                Ok(ProviderResponse {
                    message: Message::assistant_with_tool_calls(
                        response.content,
                        response.tool_calls,
                    ),
                    usage: response.usage,
                    model: "scripted-model".into(),
                })
            }
            Round::Fail(e) => Err(e),
        }
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let (chunks, hang) = match self.next_round(request) {
            Round::Chunks(chunks) => (chunks, false),
            Round::Hang(chunks) => (chunks, true),
            Round::Fail(e) => return Err(e),
        };
        let (tx, rx) = mpsc::channel(chunks.len() + 1);
        for chunk in chunks {
            tx.try_send(Ok(chunk)).unwrap();
        }
        if hang {
            self.held_open.lock().unwrap().push(tx);
        }
        Ok(rx)
    }
}

fn usage() -> Usage {
    Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    }
}

/// A round that streams `text` in a few fragments and finishes.
pub fn text_round(text: &str) -> Round {
    let mut chunks: Vec<StreamChunk> = text
        .split_inclusive(' ')
        .map(StreamChunk::text)
        .collect();
    chunks.push(StreamChunk::done(Some(usage())));
    Round::Chunks(chunks)
}

/// A round that requests tools, splitting each call's arguments across two
/// fragments.
pub fn tool_round(calls: &[(&str, &str, &str)]) -> Round {
    let mut chunks = Vec::new();
    for (index, (id, name, args)) in calls.iter().enumerate() {
        let mid = args.char_indices().nth(args.chars().count() / 2).map_or(0, |(i, _)| i);
        let (head, tail) = args.split_at(mid);
        chunks.push(StreamChunk {
            tool_calls: vec![ToolCallDelta {
                index: index as u32,
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                arguments: Some(head.to_string()),
            }],
            ..Default::default()
        });
        chunks.push(StreamChunk {
            tool_calls: vec![ToolCallDelta {
                index: index as u32,
                arguments: Some(tail.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
    }
    chunks.push(StreamChunk::done(Some(usage())));
    Round::Chunks(chunks)
}

pub fn call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EchoArgs {
    text: String,
    #[serde(default)]
    delay_ms: u64,
}

/// Echoes `text` back after an optional delay.
pub struct SlowEchoTool;

#[async_trait]
impl Tool for SlowEchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echoes back the input"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string" },
                "delay_ms": { "type": "integer" }
            },
            "required": ["text"]
        })
    }
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: EchoArgs = parse_arguments(arguments)?;
        if args.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(args.delay_ms)).await;
        }
        Ok(serde_json::json!({ "echo": args.text }))
    }
}

/// Always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "fail"
    }
    fn description(&self) -> &str {
        "Always fails"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }
    async fn execute(&self, _arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "fail".into(),
            reason: "disk on fire".into(),
        })
    }
}

/// Panics inside its handler.
pub struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "panic"
    }
    fn description(&self) -> &str {
        "Panics"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        if arguments.is_object() {
            panic!("handler bug");
        }
        Ok(serde_json::Value::Null)
    }
}
