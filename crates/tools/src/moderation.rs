use async_trait::async_trait;

use persona_core::{ImageAnalysis, ImageAnalyzer, Moderation, ModerationResult, Result};

/// Blocklist terms a keyword-level safety gate can catch without a real
/// classifier behind it. The moderation/safety classifier itself is an
/// external collaborator (spec.md §1); this is a conservative stand-in
/// so the Safety Gate (C3) is exercisable without one wired in.
const HARD_BLOCK_TERMS: &[&str] = &[
    "kinderporno", "minderjährig", "unter 18", "selbstmord", "vergewaltig", "terroranschlag",
];

pub struct KeywordModeration;

#[async_trait]
impl Moderation for KeywordModeration {
    async fn check(&self, text: &str) -> Result<ModerationResult> {
        let lower = text.to_lowercase();
        if let Some(term) = HARD_BLOCK_TERMS.iter().find(|t| lower.contains(**t)) {
            return Ok(ModerationResult {
                is_blocked: true,
                reason: Some(format!("matched blocked term: {term}")),
                error_message: Some("Diese Nachricht konnte nicht verarbeitet werden.".to_string()),
            });
        }
        Ok(ModerationResult { is_blocked: false, reason: None, error_message: None })
    }
}

/// Stand-in for the image-analysis service (spec.md §1, external
/// collaborator). Always reports an unrecognized image rather than
/// guessing; the Image Analysis agent (C5) treats this as its documented
/// failure fallback.
pub struct NullImageAnalyzer;

#[async_trait]
impl ImageAnalyzer for NullImageAnalyzer {
    async fn analyze(&self, _url: &str, _context: &str) -> Result<ImageAnalysis> {
        Ok(ImageAnalysis {
            image_type: "unknown".to_string(),
            description: String::new(),
            reaction_needed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_hard_terms() {
        let m = KeywordModeration;
        let result = m.check("Ich möchte über Selbstmord reden").await.unwrap();
        assert!(result.is_blocked);
    }

    #[tokio::test]
    async fn allows_ordinary_chat() {
        let m = KeywordModeration;
        let result = m.check("Wie war dein Tag?").await.unwrap();
        assert!(!result.is_blocked);
    }
}
