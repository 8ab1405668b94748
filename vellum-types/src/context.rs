//! Context-window state shared between the context manager and the
//! agent loop.

use serde::{Deserialize, Serialize};

/// How close a session is to needing compaction.
///
/// Ordered: `Healthy < Warning < Critical < Overflow`. Threshold
/// profiles (`vellum-context`) classify a token count into one of
/// these bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextLevel {
    /// Well under the model's compaction threshold.
    Healthy,
    /// Approaching the threshold; callers may want to warn.
    Warning,
    /// At or past the threshold; compaction should run before the next
    /// request.
    Critical,
    /// Over the model's hard context limit; compaction is mandatory.
    Overflow,
}

/// A point-in-time reading of a session's context usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContextState {
    /// Estimated tokens currently held in history.
    pub estimated_tokens: u64,
    /// The model's usable context window, in tokens.
    pub window_tokens: u64,
    /// The classification of `estimated_tokens` against `window_tokens`.
    pub level: ContextLevel,
}

impl ContextState {
    /// Fraction of the window currently in use, in `[0.0, 1.0+]` (may
    /// exceed 1.0 in `Overflow`).
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.window_tokens == 0 {
            return 0.0;
        }
        self.estimated_tokens as f64 / self.window_tokens as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(ContextLevel::Healthy < ContextLevel::Warning);
        assert!(ContextLevel::Warning < ContextLevel::Critical);
        assert!(ContextLevel::Critical < ContextLevel::Overflow);
    }

    #[test]
    fn utilization_handles_zero_window() {
        let state = ContextState { estimated_tokens: 100, window_tokens: 0, level: ContextLevel::Healthy };
        assert_eq!(state.utilization(), 0.0);
    }
}
