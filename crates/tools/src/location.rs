use persona_core::LocationQuestionClassifier;

const LOCATION_PATTERNS: &[&str] = &[
    "woher kommst du", "wo wohnst du", "wo lebst du", "aus welcher stadt",
    "in welcher stadt", "welche stadt", "woher bist du", "wo bist du zuhause",
];

pub struct KeywordLocationClassifier;

impl LocationQuestionClassifier for KeywordLocationClassifier {
    fn is_location_question(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        LOCATION_PATTERNS.iter().any(|p| lower.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_woher_kommst_du() {
        let c = KeywordLocationClassifier;
        assert!(c.is_location_question("Woher kommst du eigentlich?"));
    }

    #[test]
    fn ignores_unrelated_question() {
        let c = KeywordLocationClassifier;
        assert!(!c.is_location_question("Was machst du beruflich?"));
    }
}
