//! Tool calls and their runtime execution shadow.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;

/// What the model emitted: a request to invoke a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id for this call, assigned by the provider adapter.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// Structured arguments.
    pub arguments: serde_json::Value,
}

/// Lifecycle state of a [`ToolExecution`].
///
/// Transitions are monotonic: `Pending -> {Approved, Rejected}`,
/// `Approved -> Running`, `Running -> {Complete, Error}`. `Rejected`,
/// `Complete`, and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Waiting on a permission decision.
    Pending,
    /// Approved, not yet dispatched.
    Approved,
    /// Denied; terminal.
    Rejected,
    /// Dispatched to the tool handler.
    Running,
    /// Finished successfully; terminal.
    Complete,
    /// Finished with an error; terminal.
    Error,
}

impl ExecutionState {
    /// Whether this state is terminal (no further transition is valid).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Complete | Self::Error)
    }

    /// Whether `self -> next` is a legal transition per the state
    /// machine in [`ExecutionState`]'s docs.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use ExecutionState::{Approved, Complete, Error, Pending, Rejected, Running};
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Running)
                | (Running, Complete)
                | (Running, Error)
        )
    }
}

/// Error raised when an illegal execution state transition is attempted.
#[derive(Debug, Error)]
#[error("illegal transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    /// The state the execution was in.
    pub from: ExecutionState,
    /// The state the caller tried to move to.
    pub to: ExecutionState,
}

/// Outcome of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool call succeeded.
    pub success: bool,
    /// Output payload, present on success.
    pub output: Option<serde_json::Value>,
    /// Error message, present on failure.
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result.
    #[must_use]
    pub fn ok(output: serde_json::Value) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    /// A failed result.
    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(message.into()),
        }
    }
}

/// The runtime shadow of a [`ToolCall`]: its call plus lifecycle state.
#[derive(Debug, Clone)]
pub struct ToolExecution {
    /// The originating call.
    pub call: ToolCall,
    /// Current lifecycle state.
    pub state: ExecutionState,
    /// Result, present once `state` is `Complete` or `Error`.
    pub result: Option<ToolResult>,
    /// When execution started (state entered `Running`).
    pub started_at: Option<SystemTime>,
    /// When execution finished (state entered a terminal state).
    pub finished_at: Option<SystemTime>,
}

impl ToolExecution {
    /// Create a fresh, pending execution for a call.
    #[must_use]
    pub fn new(call: ToolCall) -> Self {
        Self {
            call,
            state: ExecutionState::Pending,
            result: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Attempt a state transition, enforcing the legal-transition table.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] if `next` is not reachable from the
    /// current state.
    pub fn transition(&mut self, next: ExecutionState) -> Result<(), IllegalTransition> {
        if !self.state.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        if next == ExecutionState::Running {
            self.started_at = Some(SystemTime::now());
        }
        if next.is_terminal() {
            self.finished_at = Some(SystemTime::now());
        }
        self.state = next;
        Ok(())
    }

    /// Complete the execution successfully, transitioning to `Complete`.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] if not currently `Running`.
    pub fn complete(&mut self, result: ToolResult) -> Result<(), IllegalTransition> {
        self.transition(ExecutionState::Complete)?;
        self.result = Some(result);
        Ok(())
    }

    /// Fail the execution, transitioning to `Error`.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] if not currently `Running`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), IllegalTransition> {
        self.transition(ExecutionState::Error)?;
        self.result = Some(ToolResult::err(message));
        Ok(())
    }
}
