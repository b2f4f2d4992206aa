//! The tool-augmented conversation loop at the heart of NoHandCoder.
//!
//! One user turn runs as:
//!
//! 1. **Append** the user message to the session's conversation
//! 2. **Stream** a model response, reassembling content and tool-call
//!    fragments with the [`StreamAccumulator`]
//! 3. **If tool calls**: record them, run them concurrently through the
//!    [`ToolDispatcher`], append one result message per call, go to step 2
//! 4. **If text only**: append it as the final answer, trim history, return
//!
//! The loop gives up with `ToolLoopExceeded` after a bounded number of
//! round-trips. Any turn-level failure restores the conversation to its
//! state before the turn.

pub mod accumulator;
pub mod dispatcher;
pub mod loop_runner;
pub mod prompt;
pub mod session;
pub mod stream_event;

#[cfg(test)]
mod test_helpers;

pub use accumulator::{AccumulatedResponse, StreamAccumulator};
pub use dispatcher::ToolDispatcher;
pub use loop_runner::{AgentLoop, TurnOutcome};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use session::Session;
pub use stream_event::{AgentStreamEvent, EventSink};
