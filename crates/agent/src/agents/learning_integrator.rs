//! Learning-Integrator (C5, layer 6). Mines `LearningStatistics` for
//! per-situation top "good" and "avoid" words, plus top successful
//! response patterns, and writes the result to the blackboard as
//! recommendations (spec.md §4.5).

use persona_core::{LearningStatistics, Situation};

use crate::blackboard::{Blackboard, PatternKind};

const MAX_WORDS: usize = 5;
const MAX_PATTERNS: usize = 3;
/// A word needs at least this many total recorded outcomes before its
/// ratio is trusted either way.
const MIN_WORD_SAMPLE: u32 = 3;

#[derive(Debug, Clone, Default)]
pub struct LearningIntegratorResult {
    /// situation -> top good words (ratio descending)
    pub good_words: Vec<(String, Vec<String>)>,
    pub avoid_words: Vec<(String, Vec<String>)>,
    pub response_patterns: Vec<(String, f32)>,
}

pub fn run(blackboard: &Blackboard, stats: &LearningStatistics, situations: &[Situation]) -> LearningIntegratorResult {
    let mut good_words = vec![];
    let mut avoid_words = vec![];

    for situation in situations {
        let Some(words) = stats.word_frequencies.get(situation.as_str()) else { continue };

        let mut scored: Vec<(&String, f32, u32)> =
            words.iter().map(|(w, s)| (w, s.ratio(), s.total())).filter(|(_, _, total)| *total >= MIN_WORD_SAMPLE).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let good: Vec<String> = scored.iter().filter(|(_, ratio, _)| *ratio >= 0.6).take(MAX_WORDS).map(|(w, _, _)| w.to_string()).collect();
        let avoid: Vec<String> = {
            let mut worst = scored.clone();
            worst.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            worst.iter().filter(|(_, ratio, _)| *ratio <= 0.4).take(MAX_WORDS).map(|(w, _, _)| w.to_string()).collect()
        };

        for word in &good {
            blackboard.add_contextual_pattern(situation.as_str(), word.clone(), PatternKind::Word);
        }
        for word in &avoid {
            blackboard.add_feedback(situation.as_str(), word.clone(), crate::blackboard::FeedbackKind::Avoid);
        }

        if !good.is_empty() {
            good_words.push((situation.as_str().to_string(), good));
        }
        if !avoid.is_empty() {
            avoid_words.push((situation.as_str().to_string(), avoid));
        }
    }

    let mut patterns: Vec<(String, f32)> = stats
        .response_patterns
        .iter()
        .filter(|p| situations.iter().any(|s| s.as_str() == p.situation))
        .map(|p| (p.good_response.clone(), p.success_rate()))
        .collect();
    patterns.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    patterns.truncate(MAX_PATTERNS);

    for (response, rate) in &patterns {
        blackboard.add_priority(
            format!("Bewährtes Antwortmuster (Erfolgsquote {rate:.0}%): {response}"),
            persona_core::Priority::Medium,
            "learning_integrator",
        );
    }

    LearningIntegratorResult { good_words, avoid_words, response_patterns: patterns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::WordScore;

    #[test]
    fn surfaces_top_good_and_avoid_words() {
        let bb = Blackboard::new();
        let mut stats = LearningStatistics::default();
        let words = stats.word_frequencies.entry("Treffen/Termine".to_string()).or_default();
        words.insert("gemütlich".to_string(), WordScore { good: 8, bad: 1 });
        words.insert("sofort".to_string(), WordScore { good: 1, bad: 9 });
        words.insert("rar".to_string(), WordScore { good: 1, bad: 0 }); // below min sample

        let situations = vec![Situation::from(Situation::TREFFEN)];
        let result = run(&bb, &stats, &situations);

        assert_eq!(result.good_words[0].1, vec!["gemütlich".to_string()]);
        assert_eq!(result.avoid_words[0].1, vec!["sofort".to_string()]);
    }

    #[test]
    fn no_data_for_situation_yields_empty() {
        let bb = Blackboard::new();
        let stats = LearningStatistics::default();
        let situations = vec![Situation::from(Situation::BERUF)];
        let result = run(&bb, &stats, &situations);
        assert!(result.good_words.is_empty());
        assert!(result.avoid_words.is_empty());
    }
}
