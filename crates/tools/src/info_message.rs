use persona_core::InfoMessageClassifier;

/// System-notice markers (likes, kisses, platform events) rather than
/// free-text chat turns. Used by the First-Message Detector (spec.md
/// §4.5) and `EngineRequest::is_first_contact_from_us`.
const INFO_MARKERS: &[&str] = &[
    "hat dich geliked", "hat dich gelikt", "hat dir einen kuss geschickt",
    "hat dich geküsst", "möchte dich kennenlernen", "hat dein profil besucht",
    "has liked you", "has kissed you", "neue nachricht von der plattform",
];

pub struct KeywordInfoMessageClassifier;

impl InfoMessageClassifier for KeywordInfoMessageClassifier {
    fn is_info_message(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        INFO_MARKERS.iter().any(|m| lower.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_like_notice() {
        let c = KeywordInfoMessageClassifier;
        assert!(c.is_info_message("Julia hat dich geliked!"));
    }

    #[test]
    fn free_text_is_not_an_info_message() {
        let c = KeywordInfoMessageClassifier;
        assert!(!c.is_info_message("Hey, wie geht es dir heute?"));
    }
}
