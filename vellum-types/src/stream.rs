//! Normalized stream events emitted by provider adapters.
//!
//! Every provider adapter (`vellum-provider-*`) translates its own wire
//! format into this single event shape, so the agent loop never branches
//! on which provider produced a turn.

use serde::{Deserialize, Serialize};

use crate::message::ContentBlock;

/// Why a turn stopped producing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a complete response with no pending tool calls.
    EndTurn,
    /// The model emitted one or more tool calls to run before continuing.
    ToolUse,
    /// A configured stop sequence was matched.
    StopSequence,
    /// The output token budget for this request was exhausted.
    MaxTokens,
    /// The request was cancelled by the caller.
    Cancelled,
    /// The context manager compacted history mid-turn; the loop should
    /// continue rather than treat this as a terminal stop.
    Compaction,
}

/// Token accounting for a single request/response exchange.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the request (prompt + history + tool definitions).
    pub input_tokens: u64,
    /// Tokens in the response.
    pub output_tokens: u64,
    /// Input tokens served from a prompt cache, if the provider reports it.
    pub cached_input_tokens: u64,
    /// Input tokens written to a prompt cache, if the provider reports it.
    pub cache_write_tokens: u64,
}

impl TokenUsage {
    /// Total tokens across input and output.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate another usage reading into this one.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cached_input_tokens += other.cached_input_tokens;
        self.cache_write_tokens += other.cache_write_tokens;
    }
}

/// A single normalized event in a provider's response stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A fragment of assistant-visible text.
    Text {
        /// The text fragment.
        delta: String,
    },
    /// A fragment of extended reasoning ("thinking") text.
    Reasoning {
        /// The reasoning text fragment.
        delta: String,
    },
    /// A tool call has begun; its name and id are now known but its
    /// arguments may still be streaming in as `ToolCallDelta` events.
    ToolCallStart {
        /// The id assigned to this call.
        id: String,
        /// The tool name.
        name: String,
    },
    /// A fragment of a tool call's arguments, as raw (possibly partial)
    /// JSON text to be accumulated and parsed once the call ends.
    ToolCallDelta {
        /// The id of the call this fragment belongs to.
        id: String,
        /// The partial-JSON argument fragment.
        delta: String,
    },
    /// A tool call has finished streaming; its arguments are now
    /// complete and valid JSON.
    ToolCallEnd {
        /// The id of the call that ended.
        id: String,
    },
    /// Token usage for the exchange, typically the final event before
    /// `End`.
    Usage {
        /// The usage reading.
        usage: TokenUsage,
    },
    /// The stream has ended.
    End {
        /// Why the turn stopped.
        reason: StopReason,
    },
}

/// Accumulates a stream of [`StreamEvent`]s into a finished set of
/// content blocks plus usage and stop reason, mirroring how a
/// non-streaming `complete` response is shaped.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    reasoning: String,
    tool_calls: Vec<PartialToolCall>,
    usage: TokenUsage,
    stop_reason: Option<StopReason>,
}

#[derive(Debug)]
struct PartialToolCall {
    id: String,
    name: String,
    raw_input: String,
}

impl StreamAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the accumulator's running state.
    pub fn push(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Text { delta } => self.text.push_str(&delta),
            StreamEvent::Reasoning { delta } => self.reasoning.push_str(&delta),
            StreamEvent::ToolCallStart { id, name } => {
                self.tool_calls.push(PartialToolCall {
                    id,
                    name,
                    raw_input: String::new(),
                });
            }
            StreamEvent::ToolCallDelta { id, delta } => {
                if let Some(call) = self.tool_calls.iter_mut().find(|c| c.id == id) {
                    call.raw_input.push_str(&delta);
                }
            }
            StreamEvent::ToolCallEnd { .. } => {}
            StreamEvent::Usage { usage } => self.usage.accumulate(&usage),
            StreamEvent::End { reason } => self.stop_reason = Some(reason),
        }
    }

    /// Finish accumulation, producing content blocks in emission order
    /// (text and thinking first, then tool calls), the accumulated
    /// usage, and the terminal stop reason.
    ///
    /// Tool-call arguments that fail to parse as JSON become an empty
    /// object rather than aborting accumulation or dropping the call.
    #[must_use]
    pub fn finish(self) -> (Vec<ContentBlock>, TokenUsage, StopReason) {
        let mut blocks = Vec::new();
        if !self.reasoning.is_empty() {
            blocks.push(ContentBlock::Thinking { text: self.reasoning });
        }
        if !self.text.is_empty() {
            blocks.push(ContentBlock::text(self.text));
        }
        for call in self.tool_calls {
            let input = serde_json::from_str(&call.raw_input).unwrap_or_else(|_| serde_json::json!({}));
            blocks.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.name,
                input,
            });
        }
        (blocks, self.usage, self.stop_reason.unwrap_or(StopReason::EndTurn))
    }
}
