//! Intervention points in the agent loop's inner cycle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HookError;

/// Where in the agent loop's inner cycle a hook fires.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Before each model inference call.
    PreInference,
    /// After the model responds, before any tool runs.
    PostInference,
    /// Before a tool call is dispatched.
    PreToolUse,
    /// After a tool call completes, before its result enters history.
    PostToolUse,
    /// At each turn/tool-call-limit check.
    ExitCheck,
}

/// Read-only context available to a hook at its firing point. Hooks
/// observe and decide; mutation happens only via [`HookAction`].
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// The point this context was built for.
    pub point: HookPoint,
    /// The tool being called, set at `PreToolUse`/`PostToolUse`.
    pub tool_name: Option<String>,
    /// The tool's input, set at `PreToolUse`.
    pub tool_input: Option<serde_json::Value>,
    /// The tool's result, set at `PostToolUse`.
    pub tool_result: Option<serde_json::Value>,
    /// Tokens consumed so far in this turn.
    pub tokens_used: u64,
    /// Turns completed so far.
    pub turns_completed: u32,
}

impl HookContext {
    /// Build a bare context for `point` with no tool/model fields set.
    #[must_use]
    pub fn new(point: HookPoint) -> Self {
        Self {
            point,
            tool_name: None,
            tool_input: None,
            tool_result: None,
            tokens_used: 0,
            turns_completed: 0,
        }
    }
}

/// What a hook decides should happen next.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookAction {
    /// Proceed normally.
    Continue,
    /// Stop the turn entirely.
    Halt {
        /// Why the turn is being halted.
        reason: String,
    },
    /// Skip this tool call without running it (`PreToolUse` only); a
    /// synthetic "skipped by policy" result is backfilled.
    SkipTool {
        /// Why the call is being skipped.
        reason: String,
    },
    /// Replace the tool's input before dispatch (`PreToolUse` only).
    ModifyToolInput {
        /// The replacement input.
        new_input: serde_json::Value,
    },
    /// Replace the tool's output before it enters history
    /// (`PostToolUse` only).
    ModifyToolOutput {
        /// The replacement output.
        new_output: serde_json::Value,
    },
}

/// Observes and may intervene in the agent loop's inner cycle.
///
/// Hooks are registered externally and called by the loop at the
/// points named in [`Hook::points`]; the loop itself does not know who
/// is watching. Handlers should complete quickly — a hook that calls
/// out to a model on every tool use adds latency to every tool call.
#[async_trait]
pub trait Hook: Send + Sync {
    /// The points this hook wants to be dispatched at.
    fn points(&self) -> &[HookPoint];

    /// Called at each registered point. An `Err` is logged and treated
    /// as `Continue`; it never halts the turn on its own.
    async fn on_event(&self, ctx: &HookContext) -> Result<HookAction, HookError>;
}
