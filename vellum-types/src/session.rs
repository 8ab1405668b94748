//! Session and checkpoint data model.
//!
//! Storage and rollback *behavior* lives in `vellum-persistence`; this
//! module only defines the shapes it persists, mirroring how
//! `vellum-provider` defines `TokenUsage`/`StopReason` shapes that the
//! loop, not the provider crate, interprets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ContextState;
use crate::message::Message;

/// A conversation plus the bookkeeping needed to resume or roll it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Stable session identifier.
    pub id: String,
    /// Full message history, including absorbed (compacted) originals —
    /// removal is a `vellum-persistence` export concern, not a property
    /// of the in-memory session.
    pub messages: Vec<Message>,
    /// Most recent context-window reading.
    pub context: ContextState,
    /// When the session was first created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new, empty session.
    #[must_use]
    pub fn new(context: ContextState) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            context,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Summary view, cheap to list without loading full history.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A lightweight listing of a [`Session`] without its message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// The session's id.
    pub id: String,
    /// Number of messages in the session at the time of listing.
    pub message_count: usize,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A named, point-in-time snapshot of a session's message history,
/// taken before a risky operation (e.g. a tool call with file-system
/// side effects) so the loop can roll back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique id for this checkpoint.
    pub id: String,
    /// The session this checkpoint belongs to.
    pub session_id: String,
    /// Message count at the time of the snapshot; rollback truncates
    /// the session's history back to this length.
    pub message_count: usize,
    /// Caller-supplied label (e.g. the tool call that triggered it).
    pub label: String,
    /// When the checkpoint was taken.
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Take a checkpoint of `session`'s current length.
    #[must_use]
    pub fn take(session: &Session, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            message_count: session.messages.len(),
            label: label.into(),
            created_at: Utc::now(),
        }
    }
}
