//! Deriving a [`ContextState`] reading from a message list.

use vellum_types::{ContextLevel, ContextState, Message};

use crate::estimate::TokenEstimator;
use crate::threshold::ThresholdProfile;

/// Classify `estimated_tokens / window_tokens` against `profile`.
#[must_use]
pub fn classify(estimated_tokens: u64, window_tokens: u64, profile: &ThresholdProfile) -> ContextLevel {
    if window_tokens == 0 {
        return ContextLevel::Healthy;
    }
    let ratio = estimated_tokens as f64 / window_tokens as f64;
    if ratio >= profile.overflow {
        ContextLevel::Overflow
    } else if ratio >= profile.critical {
        ContextLevel::Critical
    } else if ratio >= profile.warning {
        ContextLevel::Warning
    } else {
        ContextLevel::Healthy
    }
}

/// Derive a [`ContextState`] for `messages` against a model's
/// `window_tokens` and threshold `profile`.
///
/// An empty message list is always `Healthy`, matching the
/// boundary-behavior requirement that no compaction occurs with
/// nothing to compact.
#[must_use]
pub fn derive_state(
    messages: &[Message],
    window_tokens: u64,
    profile: &ThresholdProfile,
    estimator: &TokenEstimator,
) -> ContextState {
    if messages.is_empty() {
        return ContextState { estimated_tokens: 0, window_tokens, level: ContextLevel::Healthy };
    }
    let estimated_tokens = estimator.estimate_all(messages);
    let level = classify(estimated_tokens, window_tokens, profile);
    ContextState { estimated_tokens, window_tokens, level }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_healthy() {
        let profile = ThresholdProfile::balanced();
        let state = derive_state(&[], 8000, &profile, &TokenEstimator::new());
        assert_eq!(state.level, ContextLevel::Healthy);
    }

    #[test]
    fn ratio_at_overflow_threshold_classifies_as_overflow() {
        let profile = ThresholdProfile::balanced();
        assert_eq!(classify(9500, 10_000, &profile), ContextLevel::Overflow);
    }

    #[test]
    fn ratio_just_under_warning_is_healthy() {
        let profile = ThresholdProfile::balanced();
        assert_eq!(classify(7499, 10_000, &profile), ContextLevel::Healthy);
    }
}
