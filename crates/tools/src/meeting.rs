use persona_core::{HistoryMessage, MeetingRequestClassifier};

const MEETING_KEYWORDS: &[&str] = &[
    "treffen", "wann können wir uns", "sehen uns", "besuchen", "vorbeikommen",
    "triff", "date", "verabreden", "rendezvous",
];

pub struct KeywordMeetingClassifier;

impl MeetingRequestClassifier for KeywordMeetingClassifier {
    fn is_meeting_request(&self, message: &str, history: &[HistoryMessage]) -> bool {
        let lower = message.to_lowercase();
        if MEETING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return true;
        }
        history
            .iter()
            .rev()
            .take(2)
            .any(|m| MEETING_KEYWORDS.iter().any(|k| m.text.to_lowercase().contains(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_direct_meeting_request() {
        let classifier = KeywordMeetingClassifier;
        assert!(classifier.is_meeting_request("Wann können wir uns treffen?", &[]));
    }

    #[test]
    fn ignores_unrelated_message() {
        let classifier = KeywordMeetingClassifier;
        assert!(!classifier.is_meeting_request("Wie war dein Tag?", &[]));
    }
}
