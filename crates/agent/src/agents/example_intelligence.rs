//! Example-Intelligence (C5, layer 5). Consumes the retrieval layer's
//! re-ranked hits and picks a final example set for the prompt, dropping
//! near-duplicate examples so the composer doesn't see the same phrasing
//! three times.

use persona_core::VectorSearchHit;

#[derive(Debug, Clone, Default)]
pub struct ExampleIntelligenceResult {
    pub selected: Vec<VectorSearchHit>,
    pub dropped_as_redundant: usize,
    /// True when retrieval returned too few/weak matches to ground
    /// generation reliably (spec.md §4.6 "fallback mode").
    pub fallback_mode: bool,
}

/// Crude anti-redundancy check: two examples are "the same" if their
/// response text shares 80% or more of its words with an already-picked
/// one. Cheap and good enough to stop verbatim duplicates without needing
/// another embedding call.
fn is_redundant(candidate: &str, picked: &[String]) -> bool {
    let candidate_words: std::collections::HashSet<&str> = candidate.split_whitespace().collect();
    if candidate_words.is_empty() {
        return false;
    }
    picked.iter().any(|p| {
        let picked_words: std::collections::HashSet<&str> = p.split_whitespace().collect();
        let overlap = candidate_words.intersection(&picked_words).count();
        overlap as f32 / candidate_words.len() as f32 >= 0.8
    })
}

pub fn run(hits: Vec<VectorSearchHit>, min_similarity: f32) -> ExampleIntelligenceResult {
    let mut selected = vec![];
    let mut picked_texts: Vec<String> = vec![];
    let mut dropped_as_redundant = 0;

    for hit in hits {
        let text = hit.example.response_text().to_string();
        if text.is_empty() {
            continue;
        }
        if is_redundant(&text, &picked_texts) {
            dropped_as_redundant += 1;
            continue;
        }
        picked_texts.push(text);
        selected.push(hit);
    }

    let strong_matches = selected.iter().filter(|h| h.similarity >= min_similarity).count();
    let fallback_mode = strong_matches == 0;

    ExampleIntelligenceResult { selected, dropped_as_redundant, fallback_mode }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::Example;

    fn hit(response: &str, similarity: f32) -> VectorSearchHit {
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
            similarity,
        }
    }

    #[test]
    fn drops_near_duplicate_responses() {
        let hits = vec![
            hit("Na das klingt ja richtig spannend bei dir", 0.9),
            hit("Na das klingt ja richtig spannend bei dir heute", 0.85),
        ];
        let result = run(hits, 0.6);
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.dropped_as_redundant, 1);
    }

    #[test]
    fn flags_fallback_mode_when_nothing_clears_the_similarity_bar() {
        let hits = vec![hit("Irgendwas", 0.1)];
        let result = run(hits, 0.6);
        assert!(result.fallback_mode);
    }
}
