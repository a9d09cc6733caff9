//! Conversation-Flow Analyzer (C5, layer 3). Partitions history into
//! active vs. outdated context and writes "ignore this" guidance to the
//! blackboard for anything stale.

use persona_core::HistoryMessage;

use crate::blackboard::{Blackboard, FeedbackKind};

const OUTDATED_TURN_WINDOW: usize = 5;
const OUTDATED_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct ActiveContext {
    pub current_topic: String,
    pub is_reply_to_last_moderator: bool,
}

#[derive(Debug, Clone)]
pub struct ConversationFlowResult {
    pub active_context: ActiveContext,
    pub outdated_topics: Vec<String>,
    pub success: bool,
}

impl ConversationFlowResult {
    pub fn fallback() -> Self {
        Self {
            active_context: ActiveContext { current_topic: String::new(), is_reply_to_last_moderator: true },
            outdated_topics: vec![],
            success: false,
        }
    }
}

pub fn run(
    blackboard: &Blackboard,
    customer_message: &str,
    moderator_messages: &[HistoryMessage],
    customer_messages: &[HistoryMessage],
) -> ConversationFlowResult {
    let now = chrono::Utc::now();

    let mut outdated_topics = vec![];
    let all_turns: Vec<&HistoryMessage> = moderator_messages.iter().chain(customer_messages.iter()).collect();
    for (idx, message) in all_turns.iter().enumerate().rev() {
        let turns_ago = all_turns.len().saturating_sub(idx + 1);
        let too_old_by_turns = turns_ago > OUTDATED_TURN_WINDOW;
        let too_old_by_time = message
            .timestamp
            .map(|ts| now.signed_duration_since(ts).num_hours() > OUTDATED_HOURS)
            .unwrap_or(false);
        if too_old_by_turns || too_old_by_time {
            outdated_topics.push(message.text.clone());
        }
    }

    for topic in &outdated_topics {
        blackboard.add_feedback("allgemein", topic.clone(), FeedbackKind::Avoid);
    }

    let last_moderator = moderator_messages.last().map(|m| m.text.as_str()).unwrap_or_default();
    let is_reply_to_last_moderator = !last_moderator.is_empty() && !customer_message.trim().is_empty();

    ConversationFlowResult {
        active_context: ActiveContext { current_topic: customer_message.to_string(), is_reply_to_last_moderator },
        outdated_topics,
        success: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_turns_older_than_the_window_as_outdated() {
        let bb = Blackboard::new();
        let old_messages: Vec<HistoryMessage> =
            (0..8).map(|i| HistoryMessage { text: format!("turn {i}"), timestamp: None }).collect();
        let result = run(&bb, "Was machst du heute?", &old_messages, &[]);
        assert!(!result.outdated_topics.is_empty());
        assert!(result.outdated_topics.contains(&"turn 0".to_string()));
    }

    #[test]
    fn old_timestamp_marks_topic_outdated_even_within_window() {
        let bb = Blackboard::new();
        let old = HistoryMessage { text: "vor zwei Tagen".to_string(), timestamp: Some(chrono::Utc::now() - chrono::Duration::hours(48)) };
        let result = run(&bb, "Hi", &[old], &[]);
        assert!(result.outdated_topics.contains(&"vor zwei Tagen".to_string()));
    }
}
