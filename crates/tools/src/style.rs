use std::collections::HashMap;

use persona_core::{Directness, Formality, WritingStyleAnalyzer, WritingStyleFeatures};

const FORMAL_INDICATORS: &[&str] = &["sie", "ihnen", "ihr ", "könnten sie", "würden sie"];
const INFORMAL_INDICATORS: &[&str] = &["du", "dir", "dich", "dein", "deine", "magst du", "haste"];
const DIRECT_INDICATORS: &[&str] = &["magst du", "willst du", "hast du lust", "komm", "erzähl"];
const INDIRECT_INDICATORS: &[&str] = &["vielleicht", "könnte sein", "eventuell", "mal schauen"];

fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn rate(text: &str, ch: char) -> f32 {
    let len = text.chars().count();
    if len == 0 {
        return 0.0;
    }
    text.chars().filter(|c| *c == ch).count() as f32 / len as f32
}

/// Shared writing-style extraction used both by the Style Analyst agent
/// (up to the last 20 moderator messages) and by the multi-candidate
/// generator's style-feature extraction over a handful of reference
/// texts (spec.md §4.8, "Style-feature extraction (shared utility)").
pub struct RegexWritingStyleAnalyzer;

impl WritingStyleAnalyzer for RegexWritingStyleAnalyzer {
    fn analyze(&self, messages: &[String]) -> WritingStyleFeatures {
        if messages.is_empty() {
            return WritingStyleFeatures::default();
        }

        let mut total_words = 0usize;
        let mut total_sentences = 0usize;
        let mut comma_rate_sum = 0.0;
        let mut question_rate_sum = 0.0;
        let mut period_rate_sum = 0.0;
        let mut exclaim_rate_sum = 0.0;
        let mut opening_counts: HashMap<String, u32> = HashMap::new();
        let mut formal_hits = 0usize;
        let mut informal_hits = 0usize;
        let mut direct_hits = 0usize;
        let mut indirect_hits = 0usize;

        for message in messages {
            let lower = message.to_lowercase();
            let sentences = split_sentences(message);
            total_sentences += sentences.len();

            for sentence in &sentences {
                let words: Vec<&str> = sentence.split_whitespace().collect();
                total_words += words.len();
                if words.len() >= 2 {
                    opening_counts
                        .entry(words[..2].join(" ").to_lowercase())
                        .and_modify(|c| *c += 1)
                        .or_insert(1);
                }
                if words.len() >= 3 {
                    opening_counts
                        .entry(words[..3].join(" ").to_lowercase())
                        .and_modify(|c| *c += 1)
                        .or_insert(1);
                }
            }

            comma_rate_sum += rate(message, ',');
            question_rate_sum += rate(message, '?');
            period_rate_sum += rate(message, '.');
            exclaim_rate_sum += rate(message, '!');

            formal_hits += FORMAL_INDICATORS.iter().filter(|w| lower.contains(*w)).count();
            informal_hits += INFORMAL_INDICATORS.iter().filter(|w| lower.contains(*w)).count();
            direct_hits += DIRECT_INDICATORS.iter().filter(|w| lower.contains(*w)).count();
            indirect_hits += INDIRECT_INDICATORS.iter().filter(|w| lower.contains(*w)).count();
        }

        let n = messages.len() as f32;
        let sentence_count = total_sentences.max(1) as f32;

        let mut openings: Vec<(String, u32)> = opening_counts.into_iter().collect();
        openings.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let common_sentence_starts = openings.into_iter().take(10).map(|(s, _)| s).collect();

        WritingStyleFeatures {
            mean_sentence_length_words: total_words as f32 / sentence_count,
            mean_sentence_count: total_sentences as f32 / n,
            comma_rate: comma_rate_sum / n,
            question_mark_rate: question_rate_sum / n,
            period_rate: period_rate_sum / n,
            exclamation_rate: exclaim_rate_sum / n,
            common_sentence_starts,
            dominant_formality: if formal_hits > informal_hits { Formality::Formal } else { Formality::Informal },
            dominant_directness: if direct_hits >= indirect_hits { Directness::Direct } else { Directness::Indirect },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_default_features() {
        let analyzer = RegexWritingStyleAnalyzer;
        let features = analyzer.analyze(&[]);
        assert_eq!(features.mean_sentence_count, 0.0);
    }

    #[test]
    fn detects_informal_direct_style() {
        let analyzer = RegexWritingStyleAnalyzer;
        let messages = vec![
            "Magst du heute Abend Zeit haben? Erzähl mir von dir.".to_string(),
            "Komm, sag mir was du gerne machst.".to_string(),
        ];
        let features = analyzer.analyze(&messages);
        assert_eq!(features.dominant_formality, Formality::Informal);
        assert_eq!(features.dominant_directness, Directness::Direct);
        assert!(features.mean_sentence_count > 0.0);
    }
}
