//! Messages, content blocks, and the compaction-forest bookkeeping that
//! lets older turns be replaced by summaries without losing rollback
//! capability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A human user.
    User,
    /// An AI assistant.
    Assistant,
    /// A system message.
    System,
    /// A tool result reported back to the model.
    Tool,
}

/// A content block within a message.
///
/// A message's tool calls, reasoning, and text all live side by side in
/// `Message::content` rather than in separate fields, so that ordering
/// between them (e.g. thinking before a tool call) is preserved exactly
/// as the model produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content.
    Text {
        /// The text.
        text: String,
    },
    /// Extended reasoning ("thinking") content.
    Thinking {
        /// The reasoning text.
        text: String,
    },
    /// A tool invocation requested by the assistant.
    ToolUse {
        /// Unique identifier for this call, stable for its lifetime.
        id: String,
        /// Name of the tool to invoke.
        name: String,
        /// Structured arguments, already parsed from the provider's
        /// streamed argument fragments.
        input: serde_json::Value,
    },
    /// The result of a tool invocation, referencing the originating
    /// `ToolUse` by id.
    ToolResult {
        /// References the `id` from the corresponding `ToolUse`.
        tool_use_id: String,
        /// Human-readable output content.
        content: String,
        /// Whether this result represents an error.
        is_error: bool,
    },
}

impl ContentBlock {
    /// Construct a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The tool-use id this block carries, if any (`ToolUse` or
    /// `ToolResult`).
    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::ToolUse { id, .. } => Some(id),
            Self::ToolResult { tool_use_id, .. } => Some(tool_use_id),
            _ => None,
        }
    }
}

/// Compaction-forest bookkeeping attached to a message.
///
/// Exactly one message per `condense_id` is a summary; any message whose
/// `condense_parent` equals that id was absorbed into it. A summary may
/// itself carry a `condense_parent`, chaining summaries from newest to
/// oldest — see [`crate::context`] for the forest invariants this must
/// uphold.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompressionMeta {
    /// Present when this message *is* a summary: its own condense id.
    pub condense_id: Option<String>,
    /// Present when this message was absorbed into a summary: the
    /// absorbing summary's `condense_id`.
    pub condense_parent: Option<String>,
}

impl CompressionMeta {
    /// No compaction relationship.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Mark this message as a fresh summary, returning the new id.
    #[must_use]
    pub fn new_summary() -> (Self, String) {
        let id = Uuid::new_v4().to_string();
        (
            Self {
                condense_id: Some(id.clone()),
                condense_parent: None,
            },
            id,
        )
    }

    /// Mark this message as absorbed into `summary_id`.
    #[must_use]
    pub fn absorbed_into(summary_id: impl Into<String>) -> Self {
        Self {
            condense_id: None,
            condense_parent: Some(summary_id.into()),
        }
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier, unique within a session.
    pub id: String,
    /// The role of the message author.
    pub role: Role,
    /// The content blocks of this message.
    pub content: Vec<ContentBlock>,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// Compaction-forest bookkeeping.
    #[serde(default)]
    pub compression: CompressionMeta,
}

impl Message {
    fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            created_at: Utc::now(),
            compression: CompressionMeta::none(),
        }
    }

    /// Create a user message with a single text content block.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    /// Create an assistant message with a single text content block.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentBlock::text(text)])
    }

    /// Create a system message with a single text content block.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentBlock::text(text)])
    }

    /// Create an assistant message from a full set of content blocks
    /// (text, thinking, tool uses) in emission order, as produced by
    /// accumulating a provider's response stream.
    #[must_use]
    pub fn assistant_blocks(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a tool-role message carrying one tool result.
    #[must_use]
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self::new(
            Role::Tool,
            vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error,
            }],
        )
    }

    /// Build a summary message for a fresh compaction event.
    ///
    /// Returns the message plus the `condense_id` the caller must stamp
    /// onto every absorbed original (see
    /// [`CompressionMeta::absorbed_into`]).
    #[must_use]
    pub fn summary(text: impl Into<String>) -> (Self, String) {
        let (compression, id) = CompressionMeta::new_summary();
        let mut msg = Self::new(Role::Assistant, vec![ContentBlock::text(text)]);
        msg.compression = compression;
        (msg, id)
    }

    /// Concatenate all `Text` blocks, in order, separated by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All `ToolUse` blocks in this message, in emission order.
    pub fn tool_calls(&self) -> impl Iterator<Item = (&str, &str, &serde_json::Value)> {
        self.content.iter().filter_map(|b| match b {
            ContentBlock::ToolUse { id, name, input } => Some((id.as_str(), name.as_str(), input)),
            _ => None,
        })
    }

    /// Whether this message is a summary (bears a fresh `condense_id`).
    #[must_use]
    pub fn is_summary(&self) -> bool {
        self.compression.condense_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_text_role_and_id() {
        let m = Message::user("hello");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.text(), "hello");
        assert!(!m.id.is_empty());
    }

    #[test]
    fn assistant_blocks_preserves_emission_order() {
        let m = Message::assistant_blocks(vec![
            ContentBlock::Thinking { text: "pondering".into() },
            ContentBlock::text("here's the answer"),
        ]);
        assert_eq!(m.role, Role::Assistant);
        assert!(matches!(m.content[0], ContentBlock::Thinking { .. }));
        assert!(matches!(m.content[1], ContentBlock::Text { .. }));
    }

    #[test]
    fn summary_message_carries_fresh_condense_id() {
        let (summary, id) = Message::summary("recap");
        assert_eq!(summary.compression.condense_id.as_deref(), Some(id.as_str()));
        assert!(summary.is_summary());
    }

    #[test]
    fn absorbed_message_points_at_summary() {
        let (_summary, id) = Message::summary("recap");
        let mut original = Message::user("old turn");
        original.compression = CompressionMeta::absorbed_into(&id);
        assert_eq!(original.compression.condense_parent.as_deref(), Some(id.as_str()));
        assert!(!original.is_summary());
    }

    #[test]
    fn tool_calls_iterates_tool_use_blocks_only() {
        let mut m = Message::assistant("thinking...");
        m.content.push(ContentBlock::ToolUse {
            id: "t1".into(),
            name: "read_file".into(),
            input: serde_json::json!({"path": "/etc/hosts"}),
        });
        let calls: Vec<_> = m.tool_calls().collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "t1");
        assert_eq!(calls[0].1, "read_file");
    }
}
