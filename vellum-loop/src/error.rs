//! Agent loop errors.

use vellum_context::ContextError;
use vellum_provider::ProviderError;

/// Errors that terminate a [`crate::AgentLoop::run`] call.
///
/// Tool execution failures are *not* represented here: they are
/// appended as a `tool` message so the model can react, never
/// surfaced as a loop error.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// The provider rejected or failed the request after exhausting
    /// the retry budget.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The context manager could not compact below the warning
    /// threshold.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// `agent.maxTurns` was reached before `end_turn`.
    #[error("max turns ({0}) reached")]
    MaxTurns(u32),
    /// `agent.maxToolCalls` was reached before `end_turn`.
    #[error("max tool calls ({0}) reached")]
    MaxToolCalls(u32),
    /// The run was cancelled.
    #[error("cancelled")]
    Cancelled,
    /// A hook requested the turn be halted.
    #[error("halted by hook: {0}")]
    HookHalted(String),
}
