//! The on-disk/persisted session document shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vellum_types::{Checkpoint, Session};

/// Identifying metadata for a persisted session, separate from the
/// in-memory [`Session`] (which has no opinion on which provider or
/// model produced it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// The session's id, mirroring `session.id`.
    pub id: String,
    /// The provider adapter this session talks to (e.g. `"anthropic"`).
    pub provider: String,
    /// The model id in use when the session was created.
    pub model: String,
    /// When the session was first created.
    pub created_at: DateTime<Utc>,
}

/// The structured document persisted for a session: metadata, the full
/// message history, the checkpoint list, and a monotonically
/// increasing version counter bumped on every save.
///
/// Unknown fields are ignored on read so older documents stay loadable
/// across format additions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identification.
    pub metadata: SessionMetadata,
    /// The session's messages and context reading.
    pub session: Session,
    /// Checkpoints taken against this session, oldest first.
    pub checkpoints: Vec<Checkpoint>,
    /// The index (exclusive) of the last message already delivered to
    /// the UI; incremental sync sends only `messages[last_synced_index..]`.
    pub last_synced_index: usize,
    /// Bumped on every successful save.
    pub version: u64,
}

impl SessionRecord {
    /// Start a new record for a freshly created session.
    #[must_use]
    pub fn new(session: Session, provider: impl Into<String>, model: impl Into<String>) -> Self {
        let metadata = SessionMetadata {
            id: session.id.clone(),
            provider: provider.into(),
            model: model.into(),
            created_at: session.created_at,
        };
        Self { metadata, session, checkpoints: Vec::new(), last_synced_index: 0, version: 0 }
    }

    /// Messages not yet delivered to the UI.
    #[must_use]
    pub fn pending_sync(&self) -> &[vellum_types::Message] {
        &self.session.messages[self.last_synced_index.min(self.session.messages.len())..]
    }

    /// Mark all current messages as synced.
    pub fn mark_synced(&mut self) {
        self.last_synced_index = self.session.messages.len();
    }

    /// Take a new checkpoint at the session's current length.
    pub fn checkpoint(&mut self, label: impl Into<String>) -> &Checkpoint {
        let checkpoint = Checkpoint::take(&self.session, label);
        self.checkpoints.push(checkpoint);
        self.checkpoints.last().expect("just pushed")
    }

    /// Roll the session back to a previously taken checkpoint: truncate
    /// the message list to the checkpoint's recorded length and reset
    /// `last_synced_index` so the truncated tail is never assumed sent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError::UnknownCheckpoint`] if no
    /// checkpoint with `checkpoint_id` exists on this record.
    pub fn rollback(&mut self, checkpoint_id: &str) -> Result<(), crate::error::StorageError> {
        let checkpoint = self
            .checkpoints
            .iter()
            .find(|c| c.id == checkpoint_id)
            .ok_or_else(|| crate::error::StorageError::UnknownCheckpoint(checkpoint_id.to_string()))?;
        self.session.messages.truncate(checkpoint.message_count);
        self.last_synced_index = self.last_synced_index.min(self.session.messages.len());
        self.session.updated_at = Utc::now();
        Ok(())
    }
}
