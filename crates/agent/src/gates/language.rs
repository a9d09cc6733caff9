//! Language Gate (C4): detects whether the inbound message is German.
//! Two cheap heuristics run before ever calling the LLM; the LLM is only
//! consulted when both are inconclusive (spec.md §4.4).

use persona_config::constants::postprocess::{
    LANGUAGE_GATE_CONFIDENCE_THRESHOLD, LANGUAGE_GATE_HEURISTIC_SHORT_MAX_CHARS,
    LANGUAGE_GATE_HEURISTIC_WHITELIST_MAX_CHARS,
};
use persona_config::templates::{GERMAN_SHORT_GREETINGS, GERMAN_WHITELIST_WORDS};
use persona_core::Capabilities;

#[derive(Debug, Clone)]
pub struct LanguageGateResult {
    pub is_german: bool,
    pub confidence: f32,
    pub success: bool,
}

impl LanguageGateResult {
    /// Default fallback: never block on an agent failure — spec.md §7's
    /// local-recovery policy applies here too, and a false block would
    /// silently eat a legitimate German message.
    pub fn fallback() -> Self {
        Self { is_german: true, confidence: 0.0, success: false }
    }

    /// True only when confidently non-German (spec.md §4.4: "Only blocks
    /// with `is_german=false` and confidence >= 0.995").
    pub fn should_block(&self) -> bool {
        !self.is_german && self.confidence >= LANGUAGE_GATE_CONFIDENCE_THRESHOLD
    }
}

fn is_latin_only(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii() || "äöüÄÖÜß".contains(c))
}

fn has_umlaut(text: &str) -> bool {
    text.chars().any(|c| "äöüÄÖÜß".contains(c))
}

fn is_short_greeting_or_common_token(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    GERMAN_SHORT_GREETINGS.iter().any(|g| lower == *g)
}

fn has_german_whitelist_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    GERMAN_WHITELIST_WORDS
        .iter()
        .any(|w| lower.split(|c: char| !c.is_alphanumeric()).any(|token| token == *w))
}

/// Pre-LLM heuristics (spec.md §4.4). `Some(result)` short-circuits the
/// LLM call entirely; `None` means both heuristics were inconclusive.
fn heuristic_check(text: &str) -> Option<LanguageGateResult> {
    let char_count = text.chars().count();

    if char_count <= LANGUAGE_GATE_HEURISTIC_SHORT_MAX_CHARS
        && is_latin_only(text)
        && is_short_greeting_or_common_token(text)
    {
        return Some(LanguageGateResult { is_german: true, confidence: 1.0, success: true });
    }

    if char_count <= LANGUAGE_GATE_HEURISTIC_WHITELIST_MAX_CHARS
        && (has_umlaut(text) || has_german_whitelist_word(text))
    {
        return Some(LanguageGateResult { is_german: true, confidence: 1.0, success: true });
    }

    None
}

pub async fn check_language(capabilities: &Capabilities, model: &str, customer_message: &str) -> LanguageGateResult {
    if customer_message.trim().is_empty() {
        // Reactivation / first-contact-from-us turns carry no customer
        // text to classify; never block a turn we ourselves initiate.
        return LanguageGateResult { is_german: true, confidence: 1.0, success: true };
    }

    if let Some(result) = heuristic_check(customer_message) {
        return result;
    }

    let system = "Erkenne die Sprache der folgenden Nachricht. Antworte als JSON mit is_german (bool) und confidence (Zahl zwischen 0 und 1).";
    let user = format!("Nachricht: \"{customer_message}\"");

    match capabilities.llm.complete_json(model, system, &user, 0.0, 50).await {
        Ok(raw) => {
            let is_german = raw.get("is_german").and_then(|v| v.as_bool()).unwrap_or(true);
            let confidence = raw.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
            LanguageGateResult { is_german, confidence, success: true }
        }
        Err(_) => LanguageGateResult::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[tokio::test]
    async fn short_greeting_is_german_without_llm_call() {
        let mut caps = test_capabilities();
        // Any LLM call would return this JSON; a heuristic short-circuit
        // must never reach it in the first place.
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "is_german": false, "confidence": 0.999
        })));
        let result = check_language(&caps, "gpt", "Hey").await;
        assert!(result.is_german);
        assert!(!result.should_block());
    }

    #[tokio::test]
    async fn umlaut_word_is_german_without_llm_call() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "is_german": false, "confidence": 0.999
        })));
        let result = check_language(&caps, "gpt", "Wie geht es dir heute? Schönes Wetter, oder?").await;
        assert!(result.is_german);
    }

    #[tokio::test]
    async fn confident_non_german_blocks() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "is_german": false, "confidence": 0.999
        })));
        let result = check_language(&caps, "gpt", "How was your day today, tell me more please").await;
        assert!(result.should_block());
    }

    #[tokio::test]
    async fn low_confidence_non_german_does_not_block() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "is_german": false, "confidence": 0.7
        })));
        let result = check_language(&caps, "gpt", "How was your day today, tell me please").await;
        assert!(!result.should_block());
    }

    #[tokio::test]
    async fn empty_message_never_blocks() {
        let caps = test_capabilities();
        let result = check_language(&caps, "gpt", "").await;
        assert!(!result.should_block());
    }
}
