//! Replacing a prefix of older messages with a summary when the
//! conversation's estimated token usage crosses a configured
//! threshold.

use std::future::Future;

use vellum_types::{CompressionMeta, Message};

use crate::error::ContextError;
use crate::estimate::TokenEstimator;
use crate::threshold::ThresholdProfile;

/// Produces summary text for a contiguous run of older messages.
/// Implemented by the agent loop using a dedicated provider request;
/// this crate only drives the selection and bookkeeping around it.
pub trait Summarizer: Send + Sync {
    /// Summarize `messages`, preserving goals, constraints, established
    /// facts, open decisions, and pending next actions.
    fn summarize(&self, messages: &[Message]) -> impl Future<Output = Result<String, ContextError>> + Send;
}

/// Run the compaction protocol against `messages` in place:
///
/// 1. Select the oldest `N` messages such that the remaining tail's
///    estimated usage drops below `profile.warning`.
/// 2. Ask `summarizer` to produce a summary of those `N` messages.
/// 3. Stamp each absorbed original with a fresh `condenseId` via
///    `condenseParent`, and insert the summary at the front of the
///    list (the position of the oldest absorbed message), leaving the
///    originals in place for rollback.
///
/// Returns `Ok(false)` if usage is already under `warning` (no
/// compaction needed) or there are fewer than two messages to
/// consider. Returns [`ContextError::Overflow`] if absorbing all but
/// one message still leaves usage at or above `warning`.
pub async fn compact(
    messages: &mut Vec<Message>,
    window_tokens: u64,
    profile: &ThresholdProfile,
    estimator: &TokenEstimator,
    summarizer: &impl Summarizer,
) -> Result<bool, ContextError> {
    if messages.len() < 2 {
        return Ok(false);
    }

    let warning_limit = (window_tokens as f64 * profile.warning) as u64;
    if estimator.estimate_all(messages) < warning_limit {
        return Ok(false);
    }

    let mut absorb_count = 1;
    while absorb_count < messages.len() {
        let remaining = &messages[absorb_count..];
        if estimator.estimate_all(remaining) < warning_limit {
            break;
        }
        absorb_count += 1;
    }

    if absorb_count >= messages.len() {
        return Err(ContextError::Overflow);
    }

    let summary_text = summarizer.summarize(&messages[..absorb_count]).await?;
    let (summary_message, condense_id) = Message::summary(summary_text);

    for message in messages.iter_mut().take(absorb_count) {
        message.compression = CompressionMeta::absorbed_into(&condense_id);
    }
    messages.insert(0, summary_message);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSummarizer;
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, messages: &[Message]) -> Result<String, ContextError> {
            Ok(format!("summary of {} messages", messages.len()))
        }
    }

    fn filler_messages(count: usize, chars: usize) -> Vec<Message> {
        (0..count).map(|_| Message::user("x".repeat(chars))).collect()
    }

    #[tokio::test]
    async fn no_compaction_when_usage_already_healthy() {
        let mut messages = filler_messages(3, 10);
        let changed = compact(&mut messages, 1_000_000, &ThresholdProfile::balanced(), &TokenEstimator::new(), &FixedSummarizer)
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn compacts_oldest_prefix_and_preserves_originals() {
        // 100 messages, each ~96 tokens, window 8000 tokens.
        let mut messages = filler_messages(100, 380);
        let before = messages.len();
        let changed = compact(&mut messages, 8_000, &ThresholdProfile::balanced(), &TokenEstimator::new(), &FixedSummarizer)
            .await
            .unwrap();
        assert!(changed);
        // Originals are retained (rollback-able): one new summary message added.
        assert_eq!(messages.len(), before + 1);
        assert!(messages[0].is_summary());

        let absorbed = messages.iter().skip(1).filter(|m| m.compression.condense_parent.is_some()).count();
        assert!(absorbed > 0);
    }

    #[tokio::test]
    async fn overflow_when_even_single_remaining_message_exceeds_warning() {
        let mut messages = filler_messages(2, 1_000_000);
        let result = compact(&mut messages, 10, &ThresholdProfile::balanced(), &TokenEstimator::new(), &FixedSummarizer).await;
        assert!(matches!(result, Err(ContextError::Overflow)));
    }

    #[tokio::test]
    async fn single_message_never_triggers_compaction() {
        let mut messages = filler_messages(1, 1_000_000);
        let changed = compact(&mut messages, 10, &ThresholdProfile::balanced(), &TokenEstimator::new(), &FixedSummarizer)
            .await
            .unwrap();
        assert!(!changed);
    }
}
