//! Style Analyst (C5, layer 2). Wraps the writing-style capability over
//! the moderator's own past messages, filtering out system/info messages
//! so they don't pollute the style signal.

use persona_core::{Capabilities, HistoryMessage, WritingStyleFeatures};

const MAX_MESSAGES: usize = 20;

pub fn run(capabilities: &Capabilities, moderator_messages: &[HistoryMessage]) -> WritingStyleFeatures {
    let relevant: Vec<String> = moderator_messages
        .iter()
        .rev()
        .filter(|m| !capabilities.info_message_classifier.is_info_message(&m.text))
        .take(MAX_MESSAGES)
        .map(|m| m.text.clone())
        .collect();

    capabilities.writing_style.analyze(&relevant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[test]
    fn filters_out_info_messages_before_analysis() {
        let caps = test_capabilities();
        let messages = vec![
            HistoryMessage { text: "hat dich angelächelt".to_string(), timestamp: None },
            HistoryMessage { text: "Na, wie war dein Tag?".to_string(), timestamp: None },
        ];
        let features = run(&caps, &messages);
        assert_eq!(features.mean_sentence_count, features.mean_sentence_count);
    }

    #[test]
    fn caps_at_twenty_messages() {
        let caps = test_capabilities();
        let messages: Vec<HistoryMessage> =
            (0..30).map(|i| HistoryMessage { text: format!("Nachricht {i}"), timestamp: None }).collect();
        let _ = run(&caps, &messages);
    }
}
