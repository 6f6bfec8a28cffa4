//! Event classifier -- derives the ordered topic set for one canonical message.
//!
//! A single inbound message may simultaneously be, say, a slash command and
//! match the wildcard. Callers that want "any slash command" and callers that
//! want "this specific command" subscribe to different topics, so the
//! classifier emits every applicable topic rather than collapsing to one.

use crate::config::{FieldRule, TopicRules};
use crate::message::CanonicalMessage;

/// Reserved topic notified for every dispatched message.
pub const WILDCARD_TOPIC: &str = "*";

/// Classify a message into its ordered topic set.
///
/// Pure function. The wildcard topic comes first, then one entry per
/// recognized field that is present, in fixed field order: top-level `type`,
/// `event.type`, `command`, `trigger_word`, `payload.callback_id`. Rules are
/// evaluated independently; duplicates are permitted. Per-field behavior
/// (specific value, optional broad category marker) comes from `rules`.
pub fn classify(message: &CanonicalMessage, rules: &TopicRules) -> Vec<String> {
    let mut topics = vec![WILDCARD_TOPIC.to_owned()];

    // Top-level `type` contributes only when non-empty; the other fields
    // contribute on presence alone.
    push_field(
        &mut topics,
        &rules.message_type,
        message.message_type().filter(|value| !value.is_empty()),
    );
    push_field(&mut topics, &rules.event, message.event_type());
    push_field(&mut topics, &rules.command, message.command());
    push_field(&mut topics, &rules.trigger_word, message.trigger_word());
    push_field(&mut topics, &rules.callback_id, message.callback_id());

    topics
}

/// Append the topics one field rule produces for a present value.
fn push_field(topics: &mut Vec<String>, rule: &FieldRule, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    if let Some(category) = &rule.category {
        topics.push(category.clone());
    }
    if rule.specific {
        topics.push(value.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_from(value: serde_json::Value) -> CanonicalMessage {
        crate::decode::decode(value).expect("test fixture should decode")
    }

    #[test]
    fn test_empty_message_yields_wildcard_only() {
        let topics = classify(&CanonicalMessage::new(), &TopicRules::default());
        assert_eq!(topics, vec!["*"]);
    }

    #[test]
    fn test_command_message_yields_wildcard_then_command() {
        let msg = message_from(json!({"command": "/test"}));
        let topics = classify(&msg, &TopicRules::default());
        assert_eq!(topics, vec!["*", "/test"]);
    }

    #[test]
    fn test_topics_follow_fixed_field_order() {
        let msg = message_from(json!({
            "trigger_word": "bot",
            "event": {"type": "message"},
        }));
        let topics = classify(&msg, &TopicRules::default());
        assert_eq!(topics, vec!["*", "message", "bot"]);
    }

    #[test]
    fn test_all_fields_fan_out() {
        let msg = message_from(json!({
            "type": "interactive",
            "event": {"type": "reaction_added"},
            "command": "/deploy",
            "trigger_word": "bot",
            "payload": {"callback_id": "btn1"},
        }));
        let topics = classify(&msg, &TopicRules::default());
        assert_eq!(
            topics,
            vec!["*", "interactive", "reaction_added", "/deploy", "bot", "btn1"]
        );
    }

    #[test]
    fn test_empty_type_field_is_ignored() {
        let msg = message_from(json!({"type": "", "command": "/x"}));
        let topics = classify(&msg, &TopicRules::default());
        assert_eq!(topics, vec!["*", "/x"]);
    }

    #[test]
    fn test_category_marker_precedes_specific_value() {
        let mut rules = TopicRules::default();
        rules.command.category = Some("slash_command".to_owned());
        let msg = message_from(json!({"command": "/test"}));
        let topics = classify(&msg, &rules);
        assert_eq!(topics, vec!["*", "slash_command", "/test"]);
    }

    #[test]
    fn test_category_only_rule_suppresses_specific_value() {
        let mut rules = TopicRules::default();
        rules.event.specific = false;
        rules.event.category = Some("event".to_owned());
        let msg = message_from(json!({"event": {"type": "message"}}));
        let topics = classify(&msg, &rules);
        assert_eq!(topics, vec!["*", "event"]);
    }

    #[test]
    fn test_category_not_emitted_when_field_absent() {
        let mut rules = TopicRules::default();
        rules.trigger_word.category = Some("webhook".to_owned());
        let msg = message_from(json!({"command": "/test"}));
        let topics = classify(&msg, &rules);
        assert_eq!(topics, vec!["*", "/test"]);
    }

    #[test]
    fn test_duplicate_values_are_preserved() {
        // Two fields carrying the same value legitimately fan out twice.
        let msg = message_from(json!({"command": "deploy", "trigger_word": "deploy"}));
        let topics = classify(&msg, &TopicRules::default());
        assert_eq!(topics, vec!["*", "deploy", "deploy"]);
    }
}
