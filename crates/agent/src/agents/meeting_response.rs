//! Meeting-Response (C5, layer 6). Fires only when the current message is
//! a meeting request. Derives an "allowed phrases" / "blocked phrases"
//! pair from the retrieved meeting examples, so the composer can push
//! the model toward vague deflections and away from committing to a
//! concrete time or place (spec.md §4.5).

use persona_core::VectorSearchHit;

const BLOCKED_PHRASES: &[&str] =
    &["wann können wir uns treffen", "wo wohnst du genau", "lass uns treffen am"];

#[derive(Debug, Clone, Default)]
pub struct MeetingResponseResult {
    pub allowed_phrases: Vec<String>,
    pub blocked_phrases: Vec<String>,
}

/// Picks deflection phrasing out of the retrieved examples: a response
/// text counts as an "allowed" deflection if it mentions meeting-adjacent
/// wording without committing to a concrete time/place.
fn is_vague_deflection(text: &str) -> bool {
    let lower = text.to_lowercase();
    let mentions_meeting = lower.contains("treffen") || lower.contains("schauen") || lower.contains("mal sehen");
    let commits_to_specifics = lower.chars().any(|c| c.is_ascii_digit())
        || lower.contains("uhr")
        || lower.contains("morgen")
        || lower.contains("heute");
    mentions_meeting && !commits_to_specifics
}

pub fn run(meeting_examples: &[VectorSearchHit], general_examples: &[VectorSearchHit]) -> MeetingResponseResult {
    let mut allowed_phrases = vec![];

    for hit in meeting_examples.iter().chain(general_examples.iter()) {
        let text = hit.example.response_text();
        if !text.is_empty() && is_vague_deflection(text) && !allowed_phrases.iter().any(|p: &String| p == text) {
            allowed_phrases.push(text.to_string());
        }
    }

    MeetingResponseResult { allowed_phrases, blocked_phrases: BLOCKED_PHRASES.iter().map(|s| s.to_string()).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::Example;

    fn hit(response: &str) -> VectorSearchHit {
        VectorSearchHit {
            example: Example {
                id: None,
                customer_message: "x".to_string(),
                moderator_response: Some(response.to_string()),
                asa_message: None,
                situation: None,
                explanation: None,
                is_negative_example: false,
            },
            similarity: 0.9,
        }
    }

    #[test]
    fn vague_deflections_become_allowed_phrases() {
        let meeting = vec![hit("Schauen wir mal wann es bei mir klappt")];
        let result = run(&meeting, &[]);
        assert_eq!(result.allowed_phrases, vec!["Schauen wir mal wann es bei mir klappt".to_string()]);
        assert!(result.blocked_phrases.contains(&"wann können wir uns treffen".to_string()));
    }

    #[test]
    fn committed_specifics_are_not_allowed() {
        let meeting = vec![hit("Treffen wir uns morgen um 18 Uhr")];
        let result = run(&meeting, &[]);
        assert!(result.allowed_phrases.is_empty());
    }
}
