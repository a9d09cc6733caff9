//! ASA (reactivation) example selection: step 3 of the retrieval
//! algorithm. Vector search is skipped entirely; one example is drawn
//! uniformly at random from the ASA pool, never repeating the previous
//! selection for the same persona back-to-back.

use dashmap::DashMap;
use rand::seq::SliceRandom;

use persona_config::constants::retrieval::ASA_GREETING_TOKENS;
use persona_core::{Example, LearningStatistics};

/// Tracks the last ASA example id picked per persona so the next draw
/// can exclude it. Process-wide and append-only, like the embedding
/// caches.
#[derive(Default)]
pub struct AsaNoRepeatTracker {
    last_picked: DashMap<String, String>,
}

impl AsaNoRepeatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn last_for(&self, persona_id: &str) -> Option<String> {
        self.last_picked.get(persona_id).map(|v| v.clone())
    }

    fn record(&self, persona_id: &str, example_id: &str) {
        self.last_picked.insert(persona_id.to_string(), example_id.to_string());
    }
}

/// Filters out examples whose response opens with a greeting token that
/// learning stats show performs worse than it succeeds, then draws one
/// example uniformly at random, excluding the persona's previous pick
/// when possible.
///
/// Checked against the "allgemein" situation for each of
/// `ASA_GREETING_TOKENS` independently, so a single greeting accumulating
/// bad marks doesn't drag down an unrelated one. "huhu" leads that list,
/// which keeps the original single-word compatibility behavior unchanged
/// for personas where only "huhu" has learning signal.
pub fn select_asa_example<'a>(
    persona_id: &str,
    asa_examples: &'a [Example],
    stats: &LearningStatistics,
    tracker: &AsaNoRepeatTracker,
) -> Option<&'a Example> {
    let bad_greetings: Vec<&str> = ASA_GREETING_TOKENS
        .iter()
        .copied()
        .filter(|token| {
            let score = stats.word_score("allgemein", token);
            score.total() > 0 && score.bad > score.good
        })
        .collect();

    let candidates: Vec<&Example> = asa_examples
        .iter()
        .filter(|e| {
            let response = e.response_text().to_lowercase();
            !bad_greetings.iter().any(|token| response.starts_with(token))
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let last_picked = tracker.last_for(persona_id);
    let non_repeating: Vec<&&Example> = candidates
        .iter()
        .filter(|e| e.id.as_deref() != last_picked.as_deref() || last_picked.is_none())
        .collect();

    let pool: Vec<&Example> = if non_repeating.is_empty() {
        candidates
    } else {
        non_repeating.into_iter().copied().collect()
    };

    let mut rng = rand::thread_rng();
    let chosen = pool.choose(&mut rng).copied();
    if let Some(example) = chosen {
        if let Some(id) = &example.id {
            tracker.record(persona_id, id);
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(id: &str, asa_message: &str) -> Example {
        Example {
            id: Some(id.to_string()),
            customer_message: String::new(),
            moderator_response: None,
            asa_message: Some(asa_message.to_string()),
            situation: None,
            explanation: None,
            is_negative_example: false,
        }
    }

    #[test]
    fn filters_bad_huhu_greeting() {
        let mut stats = LearningStatistics::default();
        stats
            .word_frequencies
            .entry("allgemein".to_string())
            .or_default()
            .insert("huhu".to_string(), persona_core::WordScore { good: 1, bad: 9 });

        let examples = vec![example("1", "Huhu du!"), example("2", "Na, was machst du gerade?")];
        let tracker = AsaNoRepeatTracker::new();

        for _ in 0..20 {
            let picked = select_asa_example("persona-a", &examples, &stats, &tracker).unwrap();
            assert_eq!(picked.id.as_deref(), Some("2"));
        }
    }

    #[test]
    fn never_repeats_back_to_back_with_multiple_candidates() {
        let stats = LearningStatistics::default();
        let examples = vec![example("1", "Na du?"), example("2", "Wie geht's?")];
        let tracker = AsaNoRepeatTracker::new();

        let mut previous = select_asa_example("persona-a", &examples, &stats, &tracker)
            .unwrap()
            .id
            .clone();
        for _ in 0..20 {
            let picked = select_asa_example("persona-a", &examples, &stats, &tracker).unwrap();
            assert_ne!(picked.id, previous);
            previous = picked.id.clone();
        }
    }
}
