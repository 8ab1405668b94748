//! Context manager errors.

/// Errors raised while tracking or compacting a session's context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// A threshold profile failed validation (must be strictly
    /// ordered and each value in `(0, 1)`).
    #[error("invalid threshold profile: {0}")]
    InvalidThresholds(String),
    /// Summarization failed.
    #[error("compaction failed: {0}")]
    CompactionFailed(String),
    /// Usage is over the model's hard limit and compaction could not
    /// bring it back under `warning` even after absorbing all but one
    /// message.
    #[error("overflow: usage remains over the warning threshold with only one message left")]
    Overflow,
}
