//! Message and Conversation domain types.
//!
//! These are the value objects that flow through the whole system:
//! user types a line → Session appends it → AgentLoop sends the conversation
//! to the provider → tool results and the final answer are appended back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create an assistant message that requests tool calls.
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<MessageToolCall>,
    ) -> Self {
        let mut msg = Self::with_role(Role::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }
}

/// A tool call embedded in an assistant message.
///
/// `arguments` is the raw JSON text the model produced. It is only parsed
/// when the call is dispatched, so a truncated stream shows up as a
/// malformed-arguments tool failure rather than a stream error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// A conversation is an ordered sequence of messages with shared context.
///
/// When present, the system message is always `messages[0]`; [`Conversation::trim`]
/// never removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: String,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a conversation seeded with a system prompt.
    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.messages.push(Message::system(system_prompt));
        conv
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Number of messages, including the system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn system_offset(&self) -> usize {
        match self.messages.first() {
            Some(m) if m.role == Role::System => 1,
            _ => 0,
        }
    }

    /// The system message, if the conversation has one.
    pub fn system_message(&self) -> Option<&Message> {
        self.messages.first().filter(|m| m.role == Role::System)
    }

    /// Messages after the system message.
    pub fn history(&self) -> &[Message] {
        &self.messages[self.system_offset()..]
    }

    /// Drop the oldest non-system messages so that at most `max_entries`
    /// remain after the system message. Returns how many were dropped.
    ///
    /// A tool-result message is never kept without the assistant message
    /// that requested it: if the cut lands inside a tool-result run, the
    /// whole run goes too.
    pub fn trim(&mut self, max_entries: usize) -> usize {
        let offset = self.system_offset();
        let history_len = self.messages.len() - offset;
        if history_len <= max_entries {
            return 0;
        }

        let mut cut = offset + (history_len - max_entries);
        while cut < self.messages.len() && self.messages[cut].role == Role::Tool {
            cut += 1;
        }

        self.messages.drain(offset..cut);
        self.updated_at = Utc::now();
        cut - offset
    }

    /// Restore the conversation to an earlier length (see [`Conversation::len`]).
    pub fn rollback_to(&mut self, len: usize) {
        if len < self.messages.len() {
            self.messages.truncate(len);
            self.updated_at = Utc::now();
        }
    }

    /// Drop everything except the system message.
    pub fn clear_history(&mut self) {
        let offset = self.system_offset();
        self.rollback_to(offset);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
