//! Lifecycle events the agent loop emits for the rendering layer.
//!
//! Per the design note on event emission, this is a single typed
//! channel rather than an emitter-with-listeners idiom: the loop holds
//! a [`LifecycleSender`], the rendering layer (an external
//! collaborator) holds the matching receiver, and teardown is just
//! dropping the sender.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vellum_types::{RiskLevel, StopReason, ToolResult};

/// A single lifecycle event. For any `call_id`, `tool_start` precedes
/// `tool_end`; any `permission_*` event for that `call_id` precedes
/// `tool_start`; `complete` is emitted exactly once, last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A fragment of assistant-visible text.
    Text {
        /// The text fragment.
        delta: String,
    },
    /// A fragment of reasoning text.
    Reasoning {
        /// The reasoning fragment.
        delta: String,
    },
    /// A tool call is about to be dispatched.
    ToolStart {
        /// The call's id.
        call_id: String,
        /// The tool name.
        name: String,
        /// The (possibly hook-modified) input.
        input: serde_json::Value,
    },
    /// A tool call finished.
    ToolEnd {
        /// The call's id.
        call_id: String,
        /// The tool name.
        name: String,
        /// The outcome.
        result: ToolResult,
    },
    /// A tool call requires a permission decision before it can run.
    PermissionRequired {
        /// The call's id.
        call_id: String,
        /// Its computed risk level.
        risk: RiskLevel,
    },
    /// A pending permission request was granted.
    PermissionGranted {
        /// The call's id.
        call_id: String,
    },
    /// A pending permission request was denied.
    PermissionDenied {
        /// The call's id.
        call_id: String,
    },
    /// The turn has finished.
    Complete {
        /// Why it stopped.
        reason: StopReason,
    },
}

/// The sending half of a lifecycle event channel. The agent loop holds
/// one of these; closing it (dropping it) is how the loop signals
/// teardown to the rendering layer.
pub type LifecycleSender = mpsc::Sender<LifecycleEvent>;

/// The receiving half, held by the rendering layer.
pub type LifecycleReceiver = mpsc::Receiver<LifecycleEvent>;

/// Create a bounded lifecycle event channel.
#[must_use]
pub fn lifecycle_channel(capacity: usize) -> (LifecycleSender, LifecycleReceiver) {
    mpsc::channel(capacity)
}
