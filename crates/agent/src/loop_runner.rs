//! The agent reasoning loop implementation.

use chrono::Utc;
use nohandcoder_core::error::{Error, ProviderError};
use nohandcoder_core::event::{DomainEvent, EventBus};
use nohandcoder_core::message::{Conversation, Message};
use nohandcoder_core::provider::{Provider, ProviderRequest, StreamChunk, ToolCallDelta, Usage};
use nohandcoder_core::tool::ToolRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accumulator::{AccumulatedResponse, StreamAccumulator};
use crate::dispatcher::ToolDispatcher;
use crate::stream_event::{AgentStreamEvent, EventSink};

pub const DEFAULT_MAX_ITERATIONS: u32 = 8;

/// What a completed turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: String,
    /// Model round-trips, including the final one
    pub iterations: u32,
    pub tool_calls_made: usize,
    /// Summed over all round-trips that reported usage
    pub usage: Option<Usage>,
}

/// The core agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Use the provider's streaming endpoint
    stream: bool,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    dispatcher: ToolDispatcher,

    /// Maximum model round-trips per turn
    max_iterations: u32,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            stream: true,
            dispatcher: ToolDispatcher::new(tools.clone()).with_event_bus(event_bus.clone()),
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event_bus,
        }
    }

    /// Set the maximum number of model round-trips per turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Choose between the streaming and the single-response endpoint.
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Drive one user turn to its final answer.
    ///
    /// The user message must already be the last entry of `conversation`.
    /// On success the final assistant message has been appended. On error
    /// the conversation may hold a partial transcript; the caller is
    /// expected to roll it back.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        sink: Option<EventSink<'_>>,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, Error> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.len(),
            "Processing turn"
        );

        let tool_definitions = self.tools.definitions();
        let mut tool_calls_made = 0;
        let mut usage: Option<Usage> = None;

        for iteration in 1..=self.max_iterations {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            debug!(
                conversation_id = %conversation.id,
                iteration,
                "Agent loop iteration"
            );

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
                stream: self.stream,
            };

            let response = self.fetch(request, sink, cancel).await?;
            usage = add_usage(usage, response.usage);

            self.event_bus.publish(DomainEvent::ResponseGenerated {
                conversation_id: conversation.id.clone(),
                iteration,
                tool_calls: response.tool_calls.len(),
                tokens_used: response.usage.map(|u| u.total_tokens),
                timestamp: Utc::now(),
            });

            if response.tool_calls.is_empty() {
                // No tool calls: this is the final answer
                conversation.push(Message::assistant(response.content.clone()));
                info!(
                    conversation_id = %conversation.id,
                    iterations = iteration,
                    tool_calls = tool_calls_made,
                    "Turn completed"
                );
                return Ok(TurnOutcome {
                    answer: response.content,
                    iterations: iteration,
                    tool_calls_made,
                    usage,
                });
            }

            if let Some(sink) = sink {
                for tc in &response.tool_calls {
                    sink(&AgentStreamEvent::ToolCall {
                        id: tc.id.clone(),
                        name: tc.name.clone(),
                        arguments: tc.arguments.clone(),
                    });
                }
            }

            let tool_calls = response.tool_calls.clone();
            conversation.push(Message::assistant_with_tool_calls(
                response.content,
                response.tool_calls,
            ));

            // In-flight tools always run to completion, even if cancelled
            let results = self.dispatcher.dispatch(&tool_calls).await;
            tool_calls_made += results.len();

            for result in &results {
                let output = result.to_message_content();
                if let Some(sink) = sink {
                    sink(&AgentStreamEvent::ToolResult {
                        id: result.call_id.clone(),
                        name: result.tool.clone(),
                        output: output.clone(),
                        success: result.success,
                    });
                }
                conversation.push(Message::tool_result(&result.call_id, output));
            }

            // Loop back so the model sees the tool results
        }

        warn!(
            conversation_id = %conversation.id,
            max_iterations = self.max_iterations,
            "Max tool iterations reached"
        );
        Err(Error::ToolLoopExceeded {
            max_iterations: self.max_iterations,
        })
    }

    /// One model round-trip, streamed through a [`StreamAccumulator`].
    async fn fetch(
        &self,
        request: ProviderRequest,
        sink: Option<EventSink<'_>>,
        cancel: &CancellationToken,
    ) -> Result<AccumulatedResponse, Error> {
        let forward = |text: &str| {
            if let Some(sink) = sink {
                sink(&AgentStreamEvent::Chunk {
                    content: text.to_string(),
                });
            }
        };
        let mut acc = StreamAccumulator::with_sink(&forward);

        if !self.stream {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                r = self.provider.complete(request) => r?,
            };
            let message = response.message;
            acc.push(StreamChunk {
                content: Some(message.content),
                tool_calls: message
                    .tool_calls
                    .into_iter()
                    .enumerate()
                    .map(|(index, tc)| ToolCallDelta {
                        index: index as u32,
                        id: Some(tc.id),
                        name: Some(tc.name),
                        arguments: Some(tc.arguments),
                    })
                    .collect(),
                done: true,
                usage: response.usage,
            });
            return Ok(acc.finish());
        }

        let mut rx = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            r = self.provider.stream(request) => r?,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                next = rx.recv() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    acc.push(chunk);
                    if acc.is_done() {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(ProviderError::StreamInterrupted(
                        "stream closed before completion".into(),
                    )
                    .into());
                }
            }
        }

        Ok(acc.finish())
    }
}

fn add_usage(total: Option<Usage>, next: Option<Usage>) -> Option<Usage> {
    match (total, next) {
        (Some(a), Some(b)) => Some(Usage {
            prompt_tokens: a.prompt_tokens + b.prompt_tokens,
            completion_tokens: a.completion_tokens + b.completion_tokens,
            total_tokens: a.total_tokens + b.total_tokens,
        }),
        (a, b) => a.or(b),
    }
}
