//! Building the effective API history from a full, compaction-forested
//! message list.

use std::collections::HashSet;

use vellum_types::Message;

/// Filter `messages` down to the set that should actually be sent to
/// the provider: a message is included unless it was absorbed by a
/// summary that is still present in the list, and summary messages
/// themselves are included only if `include_summaries` is true.
///
/// Because the check only looks at a message's *direct* parent,
/// chains of summaries absorbing summaries are handled automatically:
/// an intermediate summary that was itself absorbed by a newer one is
/// excluded the same way any other absorbed original is, leaving only
/// the newest uncompressed layer.
#[must_use]
pub fn effective_history(messages: &[Message], include_summaries: bool) -> Vec<&Message> {
    let present_condense_ids: HashSet<&str> = messages
        .iter()
        .filter_map(|m| m.compression.condense_id.as_deref())
        .collect();

    messages
        .iter()
        .filter(|m| {
            let not_absorbed = match m.compression.condense_parent.as_deref() {
                Some(parent) => !present_condense_ids.contains(parent),
                None => true,
            };
            let summary_allowed = !m.is_summary() || include_summaries;
            not_absorbed && summary_allowed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_types::CompressionMeta;

    #[test]
    fn absorbed_originals_are_excluded_when_summary_present() {
        let (summary, id) = Message::summary("recap");
        let mut original = Message::user("old");
        original.compression = CompressionMeta::absorbed_into(&id);
        let messages = vec![original, summary];
        let effective = effective_history(&messages, true);
        assert_eq!(effective.len(), 1);
        assert!(effective[0].is_summary());
    }

    #[test]
    fn summaries_excluded_when_caller_opts_out() {
        let (summary, id) = Message::summary("recap");
        let mut original = Message::user("old");
        original.compression = CompressionMeta::absorbed_into(&id);
        let messages = vec![original, summary];
        let effective = effective_history(&messages, false);
        assert!(effective.is_empty());
    }

    #[test]
    fn chain_of_summaries_keeps_only_newest() {
        let (mut summary_a, id_a) = Message::summary("first recap");
        let (summary_b, id_b) = Message::summary("second recap");
        // summary_a (older) was absorbed into summary_b (newer).
        summary_a.compression.condense_parent = Some(id_b.clone());
        let _ = &id_a;
        let messages = vec![summary_a, summary_b];
        let effective = effective_history(&messages, true);
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].compression.condense_id.as_deref(), Some(id_b.as_str()));
    }

    #[test]
    fn unabsorbed_messages_always_included() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        assert_eq!(effective_history(&messages, true).len(), 2);
    }

    #[test]
    fn orphaned_absorbed_message_is_included_when_summary_missing() {
        let mut original = Message::user("old");
        original.compression = CompressionMeta::absorbed_into("some-condense-id-not-in-list");
        let messages = vec![original];
        assert_eq!(effective_history(&messages, true).len(), 1);
    }
}
