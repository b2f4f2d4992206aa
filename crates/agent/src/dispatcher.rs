//! Executes the tool calls of one assistant message.
//!
//! Every request yields exactly one [`ToolResult`], in request order. A tool
//! that is unknown, gets malformed arguments, returns an error or panics
//! produces a failed result; it never takes its siblings down with it.

use futures::FutureExt;
use futures::future::join_all;
use nohandcoder_core::error::ToolError;
use nohandcoder_core::event::{DomainEvent, EventBus};
use nohandcoder_core::message::MessageToolCall;
use nohandcoder_core::tool::{ToolRegistry, ToolResult};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub struct ToolDispatcher {
    tools: Arc<ToolRegistry>,
    event_bus: Option<Arc<EventBus>>,
}

impl ToolDispatcher {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            event_bus: None,
        }
    }

    /// Publish a `ToolExecuted` event for every call.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Run all requests concurrently and wait for every one to settle.
    pub async fn dispatch(&self, requests: &[MessageToolCall]) -> Vec<ToolResult> {
        if requests.is_empty() {
            return Vec::new();
        }
        debug!(tool_count = requests.len(), "Executing tool calls");
        join_all(requests.iter().map(|call| self.dispatch_one(call))).await
    }

    async fn dispatch_one(&self, call: &MessageToolCall) -> ToolResult {
        let start = Instant::now();
        let result = self.run(call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Some(error) = &result.error {
            warn!(tool = %call.name, error = %error, duration_ms, "Tool call failed");
        } else {
            debug!(tool = %call.name, duration_ms, "Tool call succeeded");
        }

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::ToolExecuted {
                tool_name: call.name.clone(),
                success: result.success,
                duration_ms,
                timestamp: chrono::Utc::now(),
            });
        }
        result
    }

    async fn run(&self, call: &MessageToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            return ToolResult::failure(
                &call.id,
                &call.name,
                ToolError::NotFound(call.name.clone()).to_string(),
            );
        };

        let arguments = match parse_call_arguments(&call.arguments) {
            Ok(arguments) => arguments,
            Err(e) => return ToolResult::failure(&call.id, &call.name, e.to_string()),
        };

        match AssertUnwindSafe(tool.execute(arguments)).catch_unwind().await {
            Ok(Ok(value)) => ToolResult::success(&call.id, &call.name, value),
            Ok(Err(e)) => ToolResult::failure(&call.id, &call.name, e.to_string()),
            Err(panic) => ToolResult::failure(
                &call.id,
                &call.name,
                format!("{} panicked: {}", call.name, panic_message(panic.as_ref())),
            ),
        }
    }
}

/// Parse the argument text the model produced. Empty means no arguments.
fn parse_call_arguments(raw: &str) -> Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(format!("{e}: {raw}")))
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingTool, PanickingTool, SlowEchoTool, call};
    use std::time::Duration;

    fn dispatcher() -> ToolDispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SlowEchoTool));
        registry.register(Box::new(FailingTool));
        registry.register(Box::new(PanickingTool));
        ToolDispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn empty_input_gives_empty_output() {
        assert!(dispatcher().dispatch(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn one_result_per_request_in_order() {
        let calls = vec![
            call("c1", "echo", r#"{"text":"slow","delay_ms":50}"#),
            call("c2", "echo", r#"{"text":"fast","delay_ms":0}"#),
            call("c3", "echo", r#"{"text":"medium","delay_ms":20}"#),
        ];
        let results = dispatcher().dispatch(&calls).await;

        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(results[0].result.as_ref().unwrap()["echo"], "slow");
        assert_eq!(results[1].result.as_ref().unwrap()["echo"], "fast");
        assert!(results.iter().all(|r| r.success));
    }

    #[tokio::test(start_paused = true)]
    async fn requests_run_concurrently() {
        let calls = vec![
            call("c1", "echo", r#"{"text":"a","delay_ms":1000}"#),
            call("c2", "echo", r#"{"text":"b","delay_ms":1000}"#),
        ];
        let start = tokio::time::Instant::now();
        dispatcher().dispatch(&calls).await;
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failed_result() {
        let results = dispatcher()
            .dispatch(&[call("c1", "deleteEverything", "{}")])
            .await;
        assert!(!results[0].success);
        assert_eq!(results[0].tool, "deleteEverything");
        assert!(
            results[0]
                .error
                .as_deref()
                .unwrap()
                .starts_with("unknown tool")
        );
    }

    #[tokio::test]
    async fn malformed_arguments_are_a_failed_result() {
        let results = dispatcher()
            .dispatch(&[
                call("c1", "echo", r#"{"text": "unterminated"#),
                call("c2", "echo", r#"{"wrong_field": 1}"#),
            ])
            .await;
        for r in &results {
            assert!(!r.success);
            assert!(r.error.as_deref().unwrap().contains("malformed tool arguments"));
        }
    }

    #[tokio::test]
    async fn failing_and_panicking_tools_do_not_abort_siblings() {
        let results = dispatcher()
            .dispatch(&[
                call("c1", "fail", "{}"),
                call("c2", "echo", r#"{"text":"still here"}"#),
                call("c3", "panic", "{}"),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("disk on fire"));
        assert!(results[1].success);
        assert_eq!(results[1].result.as_ref().unwrap()["echo"], "still here");
        assert!(!results[2].success);
        assert!(results[2].error.as_deref().unwrap().contains("panicked"));
    }

    #[tokio::test]
    async fn empty_argument_text_means_no_arguments() {
        let results = dispatcher().dispatch(&[call("c1", "fail", "")]).await;
        // Reached the handler rather than failing to parse
        assert!(results[0].error.as_deref().unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn publishes_tool_executed_events() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let dispatcher = dispatcher().with_event_bus(bus);

        dispatcher
            .dispatch(&[call("c1", "echo", r#"{"text":"x"}"#), call("c2", "fail", "{}")])
            .await;

        let mut seen = Vec::new();
        for _ in 0..2 {
            if let DomainEvent::ToolExecuted {
                tool_name, success, ..
            } = rx.recv().await.unwrap().as_ref()
            {
                seen.push((tool_name.clone(), *success));
            }
        }
        seen.sort();
        assert_eq!(
            seen,
            vec![("echo".to_string(), true), ("fail".to_string(), false)]
        );
    }
}
