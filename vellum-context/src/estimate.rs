//! Heuristic token estimation over a message list.

use vellum_types::{ContentBlock, Message};

/// Estimates token counts from character counts, the same
/// chars-per-token heuristic used across the pack's context
/// strategies — exact enough to drive threshold crossing without a
/// real tokenizer dependency.
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    chars_per_token: usize,
}

impl TokenEstimator {
    /// Create an estimator with the default ratio (4 chars/token).
    #[must_use]
    pub fn new() -> Self {
        Self { chars_per_token: 4 }
    }

    /// Create an estimator with a custom ratio.
    #[must_use]
    pub fn with_ratio(chars_per_token: usize) -> Self {
        Self { chars_per_token: chars_per_token.max(1) }
    }

    /// Estimate one message's token count, including a small per-message
    /// overhead for role/formatting.
    #[must_use]
    pub fn estimate_message(&self, message: &Message) -> u64 {
        let content_chars: usize = message
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } | ContentBlock::Thinking { text } => text.len(),
                ContentBlock::ToolUse { input, .. } => input.to_string().len(),
                ContentBlock::ToolResult { content, .. } => content.len(),
            })
            .sum();
        (content_chars / self.chars_per_token) as u64 + 4
    }

    /// Estimate the total token count of `messages`.
    #[must_use]
    pub fn estimate_all(&self, messages: &[Message]) -> u64 {
        messages.iter().map(|m| self.estimate_message(m)).sum()
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_scale_with_ratio() {
        let estimator = TokenEstimator::with_ratio(4);
        let message = Message::user("a".repeat(400));
        assert_eq!(estimator.estimate_message(&message), 104);
    }

    #[test]
    fn empty_message_list_has_zero_tokens() {
        let estimator = TokenEstimator::new();
        assert_eq!(estimator.estimate_all(&[]), 0);
    }
}
