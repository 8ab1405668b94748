//! Configuration for the agent loop.

use vellum_provider::{RetryPolicy, SamplingParams, ThinkingConfig};

/// Configuration for [`crate::AgentLoop`].
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum number of resubmission turns before the loop gives up.
    /// `None` means no limit.
    pub max_turns: Option<u32>,
    /// Maximum number of tool calls across the whole run. `None` means
    /// no limit.
    pub max_tool_calls: Option<u32>,
    /// Upper bound on tool executions running concurrently within a
    /// single turn.
    pub max_concurrent_tools: usize,
    /// Whether the effective API history includes summary messages
    /// (see `vellum_context::effective_history`).
    pub include_summaries: bool,
    /// Whether the context manager is consulted before each
    /// submission. Disabling this is a debugging escape hatch; normal
    /// operation leaves it on.
    pub context_management_enabled: bool,
    /// The model's usable context window, in tokens.
    pub window_tokens: u64,
    /// Sampling parameters forwarded on every request.
    pub sampling: SamplingParams,
    /// Extended-reasoning configuration, if any.
    pub thinking: Option<ThinkingConfig>,
    /// Retry policy for retryable provider errors.
    pub retry: RetryPolicy,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            max_tool_calls: None,
            max_concurrent_tools: 8,
            include_summaries: true,
            context_management_enabled: true,
            window_tokens: 200_000,
            sampling: SamplingParams::default(),
            thinking: None,
            retry: RetryPolicy::default(),
        }
    }
}
