//! A single conversational session.
//!
//! The session owns the conversation. Each call to
//! [`Session::handle_user_input`] is one turn: it either appends the user
//! message, the tool transcript and the final answer, or (on any failure,
//! including cancellation) leaves history exactly as it was.

use chrono::Utc;
use nohandcoder_config::AppConfig;
use nohandcoder_core::error::Error;
use nohandcoder_core::event::{DomainEvent, EventBus};
use nohandcoder_core::message::{Conversation, Message};
use nohandcoder_core::provider::Provider;
use nohandcoder_core::tool::ToolRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::loop_runner::AgentLoop;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::stream_event::{AgentStreamEvent, EventSink};

pub const DEFAULT_MAX_HISTORY: usize = 20;

pub struct Session {
    agent: AgentLoop,
    conversation: Conversation,
    /// Entries kept after the system message once a turn completes
    max_history: usize,
}

impl Session {
    pub fn new(agent: AgentLoop, system_prompt: impl Into<String>) -> Self {
        Self {
            agent,
            conversation: Conversation::with_system(system_prompt),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    /// Build a session from the loaded configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let agent = AgentLoop::new(
            provider,
            config.model.clone(),
            config.temperature,
            tools,
            event_bus,
        )
        .with_max_iterations(config.agent.max_iterations)
        .with_max_tokens(config.max_tokens)
        .with_streaming(config.stream);

        let prompt = config
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Self::new(agent, prompt).with_max_history(config.agent.max_history)
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Run one turn and return the final answer.
    pub async fn handle_user_input(
        &mut self,
        text: &str,
        sink: Option<EventSink<'_>>,
    ) -> Result<String, Error> {
        self.handle_user_input_with_cancel(text, sink, &CancellationToken::new())
            .await
    }

    /// Like [`Session::handle_user_input`], but stops early once `cancel`
    /// fires. Tools already running finish first.
    pub async fn handle_user_input_with_cancel(
        &mut self,
        text: &str,
        sink: Option<EventSink<'_>>,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let checkpoint = self.conversation.len();
        self.conversation.push(Message::user(text));

        match self
            .agent
            .run_turn(&mut self.conversation, sink, cancel)
            .await
        {
            Ok(outcome) => {
                let dropped = self.conversation.trim(self.max_history);
                if dropped > 0 {
                    debug!(
                        dropped,
                        kept = self.conversation.history().len(),
                        "Trimmed conversation history"
                    );
                }

                self.agent.event_bus().publish(DomainEvent::TurnCompleted {
                    conversation_id: self.conversation.id.clone(),
                    iterations: outcome.iterations,
                    tool_calls_made: outcome.tool_calls_made,
                    timestamp: Utc::now(),
                });
                if let Some(sink) = sink {
                    sink(&AgentStreamEvent::Done {
                        conversation_id: self.conversation.id.clone(),
                        usage: outcome.usage,
                        iterations: outcome.iterations,
                        tool_calls_made: outcome.tool_calls_made,
                    });
                }
                Ok(outcome.answer)
            }
            Err(e) => {
                self.conversation.rollback_to(checkpoint);
                warn!(
                    conversation_id = %self.conversation.id,
                    error = %e,
                    "Turn failed, history rolled back"
                );

                self.agent.event_bus().publish(DomainEvent::TurnFailed {
                    conversation_id: self.conversation.id.clone(),
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                if let Some(sink) = sink {
                    sink(&AgentStreamEvent::Error {
                        message: e.to_string(),
                        retryable: e.is_retryable(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Messages after the system message.
    pub fn history(&self) -> &[Message] {
        self.conversation.history()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Forget everything except the system message.
    pub fn reset(&mut self) {
        self.conversation.clear_history();
    }
}
