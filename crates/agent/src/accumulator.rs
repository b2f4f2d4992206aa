//! Reassembles a streamed model response.
//!
//! Providers forward tool-call deltas as they arrive: the first delta for a
//! call carries its `id` and `name`, the rest only carry slices of the
//! argument JSON. Deltas are keyed by the call's stream index, and several
//! calls can be interleaved.

use nohandcoder_core::message::MessageToolCall;
use nohandcoder_core::provider::{StreamChunk, ToolCallDelta, Usage};
use std::collections::BTreeMap;

/// Receives each content fragment as soon as it arrives.
pub type ContentSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Everything one model round-trip produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedResponse {
    pub content: String,
    /// Ordered by stream index
    pub tool_calls: Vec<MessageToolCall>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Default)]
struct ToolCallSlot {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

pub struct StreamAccumulator<'a> {
    content: String,
    slots: BTreeMap<u32, ToolCallSlot>,
    usage: Option<Usage>,
    done: bool,
    sink: Option<ContentSink<'a>>,
}

impl<'a> StreamAccumulator<'a> {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            slots: BTreeMap::new(),
            usage: None,
            done: false,
            sink: None,
        }
    }

    pub fn with_sink(sink: ContentSink<'a>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::new()
        }
    }

    pub fn push(&mut self, chunk: StreamChunk) {
        if let Some(text) = chunk.content
            && !text.is_empty()
        {
            if let Some(sink) = self.sink {
                sink(&text);
            }
            self.content.push_str(&text);
        }

        for delta in chunk.tool_calls {
            self.push_tool_delta(delta);
        }

        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }
        if chunk.done {
            self.done = true;
        }
    }

    fn push_tool_delta(&mut self, delta: ToolCallDelta) {
        let slot = self.slots.entry(delta.index).or_default();
        // id and name arrive once; later repeats don't overwrite them
        if slot.id.is_none()
            && let Some(id) = delta.id.filter(|s| !s.is_empty())
        {
            slot.id = Some(id);
        }
        if slot.name.is_none()
            && let Some(name) = delta.name.filter(|s| !s.is_empty())
        {
            slot.name = Some(name);
        }
        if let Some(fragment) = delta.arguments {
            slot.arguments.push_str(&fragment);
        }
    }

    /// Whether the provider has signalled the end of the response.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn finish(self) -> AccumulatedResponse {
        let tool_calls = self
            .slots
            .into_iter()
            .map(|(index, slot)| MessageToolCall {
                id: slot.id.unwrap_or_else(|| format!("call_{index}")),
                name: slot.name.unwrap_or_default(),
                arguments: slot.arguments,
            })
            .collect();

        AccumulatedResponse {
            content: self.content,
            tool_calls,
            usage: self.usage,
        }
    }
}

impl Default for StreamAccumulator<'_> {
    fn default() -> Self {
        Self::new()
    }
}
