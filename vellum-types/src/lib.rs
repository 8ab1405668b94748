//! Core data model for the Vellum agent runtime.
//!
//! This crate has no behavior of its own: it defines the message,
//! tool-call, session, and stream-event shapes that every other crate
//! in the workspace builds on.

#![deny(missing_docs)]

pub mod context;
pub mod evidence;
pub mod message;
pub mod plugin;
pub mod risk;
pub mod session;
pub mod stream;
pub mod tool;

pub use context::{ContextLevel, ContextState};
pub use evidence::{Evidence, Signal};
pub use message::{CompressionMeta, ContentBlock, Message, Role};
pub use plugin::{Capability, TrustLevel, TrustedPluginRecord};
pub use risk::RiskLevel;
pub use session::{Checkpoint, Session, SessionSummary};
pub use stream::{StopReason, StreamAccumulator, StreamEvent, TokenUsage};
pub use tool::{ExecutionState, IllegalTransition, ToolCall, ToolExecution, ToolResult};
