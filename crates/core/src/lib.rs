//! # NoHandCoder Core
//!
//! Domain types, traits, and error definitions for the NoHandCoder coding
//! assistant. This crate has **no framework dependencies**; it defines the
//! domain model that the provider, tool, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the conversation loop is defined as a trait here:
//! - [`Provider`] — the remote chat-completion endpoint
//! - [`Tool`] — a local side-effecting operation the model may request
//!
//! Implementations live in their respective crates, which keeps the agent loop
//! testable against scripted providers and in-memory tools.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolCallDelta};
pub use tool::{Tool, ToolRegistry, ToolResult, parse_arguments};
