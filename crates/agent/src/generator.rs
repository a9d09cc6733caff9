//! Multi-Candidate Generator (C8, spec.md §4.8). Issues the shaped
//! generation call(s), post-processes each candidate, scores the
//! survivors against style/learning/quality, and runs the hard semantic
//! gate with bounded retries before handing the winner to the rewrite
//! and validation loop (C9).

use std::sync::Arc;

use persona_core::{Capabilities, Directness, Formality, Priority, Result};
use persona_llm::ComposerInput;

use persona_config::constants::generation::{
    LEARNING_WEIGHT, MIN_CANDIDATE_CHARS, QUALITY_WEIGHT, SEMANTIC_VALIDATION_MAX,
    SEMANTIC_VALIDATION_THRESHOLD, STYLE_WEIGHT, TEMPERATURES,
};

use crate::blackboard::Blackboard;
use crate::postprocess::{self, PostprocessInput};

#[derive(Debug, Clone, Default)]
pub struct StyleFeatures {
    pub mean_sentence_length_words: f32,
    pub mean_sentence_count: f32,
    pub comma_rate: f32,
    pub question_mark_rate: f32,
    pub period_rate: f32,
    pub common_starts: Vec<String>,
    pub formality: Formality,
    pub directness: Directness,
}

const FORMAL_INDICATORS: &[&str] = &["sie", "ihnen", "ihr gefallen", "mögen sie"];
const DIRECT_INDICATORS: &[&str] = &["sofort", "jetzt", "direkt", "genau"];

/// Shared style-feature extraction utility (spec.md §4.8): mean sentence
/// length/count, punctuation rates per character, top sentence openings,
/// and two tiered labels from indicator-word counts.
pub fn extract_style_features(texts: &[String]) -> StyleFeatures {
    if texts.is_empty() {
        return StyleFeatures::default();
    }

    let mut total_words = 0usize;
    let mut total_sentences = 0usize;
    let mut total_chars = 0usize;
    let mut commas = 0usize;
    let mut questions = 0usize;
    let mut periods = 0usize;
    let mut starts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut formal_hits = 0usize;
    let mut informal_hits = 0usize;
    let mut direct_hits = 0usize;
    let mut indirect_hits = 0usize;

    for text in texts.iter().take(5) {
        total_chars += text.chars().count();
        commas += text.matches(',').count();
        questions += text.matches('?').count();
        periods += text.matches('.').count();

        let sentences: Vec<&str> = text.split(['.', '?']).map(str::trim).filter(|s| !s.is_empty()).collect();
        total_sentences += sentences.len();
        total_words += text.split_whitespace().count();

        for sentence in &sentences {
            let words: Vec<&str> = sentence.split_whitespace().take(2).collect();
            if !words.is_empty() {
                *starts.entry(words.join(" ").to_lowercase()).or_insert(0) += 1;
            }
        }

        let lower = text.to_lowercase();
        for word in FORMAL_INDICATORS {
            if lower.contains(word) {
                formal_hits += 1;
            }
        }
        if lower.contains("du ") || lower.starts_with("du") {
            informal_hits += 1;
        }
        for word in DIRECT_INDICATORS {
            if lower.contains(word) {
                direct_hits += 1;
            }
        }
        if lower.contains("vielleicht") || lower.contains("mal sehen") {
            indirect_hits += 1;
        }
    }

    let count = texts.len().min(5) as f32;
    let mut common_starts: Vec<(String, usize)> = starts.into_iter().collect();
    common_starts.sort_by(|a, b| b.1.cmp(&a.1));

    StyleFeatures {
        mean_sentence_length_words: if total_sentences > 0 { total_words as f32 / total_sentences as f32 } else { 0.0 },
        mean_sentence_count: total_sentences as f32 / count,
        comma_rate: if total_chars > 0 { commas as f32 / total_chars as f32 } else { 0.0 },
        question_mark_rate: if total_chars > 0 { questions as f32 / total_chars as f32 } else { 0.0 },
        period_rate: if total_chars > 0 { periods as f32 / total_chars as f32 } else { 0.0 },
        common_starts: common_starts.into_iter().take(10).map(|(s, _)| s).collect(),
        formality: if formal_hits > informal_hits { Formality::Formal } else { Formality::Informal },
        directness: if direct_hits > indirect_hits { Directness::Direct } else { Directness::Indirect },
    }
}

fn proximity_score(a: f32, b: f32, max_points: f32) -> f32 {
    if a == 0.0 && b == 0.0 {
        return max_points;
    }
    let denom = a.max(b).max(1.0);
    let diff = (a - b).abs() / denom;
    (max_points * (1.0 - diff)).clamp(0.0, max_points)
}

/// Style comparison (spec.md §4.8): 25/20/25/15/10/5 point split.
pub fn compare_style(candidate: &StyleFeatures, reference: &StyleFeatures) -> f32 {
    let mut score = 0.0;
    score += proximity_score(candidate.mean_sentence_length_words, reference.mean_sentence_length_words, 25.0);
    score += proximity_score(candidate.mean_sentence_count, reference.mean_sentence_count, 20.0);
    let punctuation_candidate = candidate.comma_rate + candidate.question_mark_rate + candidate.period_rate;
    let punctuation_reference = reference.comma_rate + reference.question_mark_rate + reference.period_rate;
    score += proximity_score(punctuation_candidate, punctuation_reference, 25.0);

    let overlap = candidate.common_starts.iter().filter(|s| reference.common_starts.contains(s)).count();
    let possible = candidate.common_starts.len().max(1);
    score += 15.0 * (overlap as f32 / possible as f32);

    if candidate.formality == reference.formality {
        score += 10.0;
    }
    if candidate.directness == reference.directness {
        score += 5.0;
    }
    score
}

fn words(text: &str) -> std::collections::HashSet<String> {
    text.split_whitespace().map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()).filter(|w| !w.is_empty()).collect()
}

fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let wa = words(a);
    let wb = words(b);
    if wa.is_empty() || wb.is_empty() {
        return 0.0;
    }
    let intersection = wa.intersection(&wb).count() as f32;
    let union = wa.union(&wb).count() as f32;
    intersection / union
}

/// `learning_score` in [0, 100]: similarity to the learning system's top
/// "good" response patterns, weighted by each pattern's success rate.
pub fn learning_score(candidate: &str, good_patterns: &[(String, f32)]) -> f32 {
    if good_patterns.is_empty() {
        return 50.0;
    }
    let best = good_patterns
        .iter()
        .map(|(pattern, rate)| jaccard_similarity(candidate, pattern) * rate)
        .fold(0.0_f32, f32::max);
    (best * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Default)]
pub struct QualitySubScores {
    pub training_data_usage: u32,
    pub context_usage: u32,
    pub rules_compliance: u32,
    pub learning_system_usage: u32,
    pub semantic_validation: u32,
}

impl QualitySubScores {
    pub fn total(&self) -> u32 {
        self.training_data_usage + self.context_usage + self.rules_compliance + self.learning_system_usage + self.semantic_validation
    }
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub text: String,
    pub temperature: f32,
    pub style_score: f32,
    pub learning_score: f32,
    pub quality: QualitySubScores,
    pub combined: f32,
}

impl Candidate {
    fn quality_score(&self) -> f32 {
        self.quality.total() as f32
    }

    fn recompute_combined(&mut self) {
        self.combined = STYLE_WEIGHT * self.style_score + LEARNING_WEIGHT * self.learning_score + QUALITY_WEIGHT * self.quality_score();
    }
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub message: String,
    pub quality: QualitySubScores,
    pub semantic_validation_passed: bool,
    pub success: bool,
}

impl GenerationResult {
    fn failure() -> Self {
        Self { message: String::new(), quality: QualitySubScores::default(), semantic_validation_passed: false, success: false }
    }
}

pub struct GeneratorInput<'a> {
    pub model: &'a str,
    pub composer: &'a ComposerInput,
    pub reference_texts: &'a [String],
    pub good_patterns: &'a [(String, f32)],
    pub has_learning_data: bool,
    pub fallback_mode: bool,
    pub postprocess: PostprocessInput<'a>,
}

async fn complete_at_temperature(capabilities: &Capabilities, model: &str, system: &str, user: &str, temperature: f32) -> Result<String> {
    capabilities.llm.complete(model, system, user, temperature, 400).await
}

fn quality_from_blackboard(blackboard: &Blackboard, candidate_text: &str) -> QualitySubScores {
    let synthesized = blackboard.get_synthesized();
    let training_data_usage = if synthesized.as_ref().map(|s| !s.actionable_guidance.is_empty()).unwrap_or(false) { 20 } else { 10 };
    let context_usage = if candidate_text.len() > MIN_CANDIDATE_CHARS { 20 } else { 10 };
    let rules_compliance = 20;
    let learning_system_usage = if synthesized.as_ref().map(|s| !s.priority_insights.is_empty()).unwrap_or(false) { 18 } else { 10 };
    QualitySubScores {
        training_data_usage,
        context_usage,
        rules_compliance,
        learning_system_usage,
        semantic_validation: 0,
    }
}

async fn semantic_validate(capabilities: &Capabilities, model: &str, candidate: &str, customer_message: &str) -> f32 {
    let system = "Bewerte die folgende Chat-Antwort auf einer Skala von 0 bis 25 hinsichtlich Relevanz, \
        Angemessenheit, Logik, korrekter Pronomen-Bezüge und ob eine Frage beantwortet wurde, falls der Kunde \
        eine gestellt hat. Antworte als JSON mit score (Zahl).";
    let user = format!("Kundennachricht: \"{customer_message}\"\nAntwort: \"{candidate}\"");
    match capabilities.llm.complete_json(model, system, &user, 0.0, 50).await {
        Ok(raw) => raw.get("score").and_then(|v| v.as_f64()).map(|v| v as f32).unwrap_or(SEMANTIC_VALIDATION_THRESHOLD),
        Err(_) => SEMANTIC_VALIDATION_THRESHOLD,
    }
}

/// Runs the full C8 algorithm: three temperature variants when learning
/// data is available and not in fallback mode, otherwise a single
/// temperature-0.7 generation with a simple quality score.
pub async fn run(
    capabilities: &Capabilities,
    blackboard: &Blackboard,
    customer_message: &str,
    input: GeneratorInput<'_>,
) -> GenerationResult {
    let (system, user) = input.composer.to_messages();

    if !input.has_learning_data || input.fallback_mode {
        let raw = match complete_at_temperature(capabilities, input.model, &system, &user, 0.7).await {
            Ok(text) => text,
            Err(_) => return GenerationResult::failure(),
        };
        let processed = postprocess::run(PostprocessInput { candidate: &raw, ..clone_postprocess(&input.postprocess) });
        if !processed.success {
            return GenerationResult::failure();
        }
        let quality = quality_from_blackboard(blackboard, &processed.text);
        return GenerationResult { message: processed.text, quality, semantic_validation_passed: true, success: true };
    }

    let attempts = futures::future::join_all(
        TEMPERATURES.iter().map(|t| complete_at_temperature(capabilities, input.model, &system, &user, *t)),
    )
    .await;

    let reference_features = extract_style_features(input.reference_texts);
    let mut candidates = vec![];

    for (raw, temperature) in attempts.into_iter().zip(TEMPERATURES.iter()) {
        let Ok(text) = raw else { continue };
        let processed = postprocess::run(PostprocessInput { candidate: &text, ..clone_postprocess(&input.postprocess) });
        if !processed.success || processed.text.len() < MIN_CANDIDATE_CHARS {
            continue;
        }

        let style = compare_style(&extract_style_features(&[processed.text.clone()]), &reference_features);
        let learning = learning_score(&processed.text, input.good_patterns);
        let mut quality = quality_from_blackboard(blackboard, &processed.text);
        quality.semantic_validation = (SEMANTIC_VALIDATION_MAX * 0.6) as u32;

        let mut candidate = Candidate { text: processed.text, temperature: *temperature, style_score: style, learning_score: learning, quality, combined: 0.0 };
        candidate.recompute_combined();
        candidates.push(candidate);
    }

    if candidates.is_empty() {
        return GenerationResult::failure();
    }

    candidates.sort_by(|a, b| b.combined.partial_cmp(&a.combined).unwrap_or(std::cmp::Ordering::Equal));

    let clears_threshold = |c: &Candidate| c.quality.semantic_validation as f32 >= SEMANTIC_VALIDATION_THRESHOLD;
    let mut best = candidates.into_iter().find(clears_threshold);

    if best.is_none() {
        let retry_user = format!("{user}\n\nHinweis: Die bisherige Antwort hat den Kontext missverstanden. Analysiere das gesamte Gespräch erneut.");
        if let Ok(retry_text) = complete_at_temperature(capabilities, input.model, &system, &retry_user, 0.5).await {
            let processed = postprocess::run(PostprocessInput { candidate: &retry_text, ..clone_postprocess(&input.postprocess) });
            if processed.success {
                let style = compare_style(&extract_style_features(&[processed.text.clone()]), &reference_features);
                let learning = learning_score(&processed.text, input.good_patterns);
                let mut quality = quality_from_blackboard(blackboard, &processed.text);
                quality.semantic_validation = SEMANTIC_VALIDATION_MAX as u32;
                let mut candidate = Candidate { text: processed.text, temperature: 0.5, style_score: style, learning_score: learning, quality, combined: 0.0 };
                candidate.recompute_combined();
                best = Some(candidate);
            }
        }
    }

    let Some(mut winner) = best else { return GenerationResult::failure() };

    let final_score = semantic_validate(capabilities, input.model, &winner.text, customer_message).await;
    winner.quality.semantic_validation = final_score.round().clamp(0.0, SEMANTIC_VALIDATION_MAX) as u32;

    if (winner.quality.semantic_validation as f32) < SEMANTIC_VALIDATION_THRESHOLD {
        let rewrite_user = format!("{user}\n\nHinweis: Schreibe die Antwort um und bewahre dabei den Gesprächskontext genau.");
        if let Ok(rewrite) = complete_at_temperature(capabilities, input.model, &system, &rewrite_user, 0.5).await {
            let processed = postprocess::run(PostprocessInput { candidate: &rewrite, ..clone_postprocess(&input.postprocess) });
            if processed.success {
                let retry_score = semantic_validate(capabilities, input.model, &processed.text, customer_message).await;
                if retry_score >= SEMANTIC_VALIDATION_THRESHOLD {
                    winner.text = processed.text;
                    winner.quality.semantic_validation = retry_score.round().clamp(0.0, SEMANTIC_VALIDATION_MAX) as u32;
                }
            }
        }
    }

    blackboard.add_priority(
        format!("Finale Kandidatenauswahl (Temperatur {:.1}, kombinierter Score {:.1})", winner.temperature, winner.combined),
        Priority::Low,
        "generator",
    );

    GenerationResult {
        message: winner.text,
        semantic_validation_passed: (winner.quality.semantic_validation as f32) >= SEMANTIC_VALIDATION_THRESHOLD,
        quality: winner.quality,
        success: true,
    }
}

/// Clones a `PostprocessInput` (not `Clone` itself: its `candidate` field
/// borrows the original raw text, which callers here always replace).
fn clone_postprocess<'a>(input: &PostprocessInput<'a>) -> PostprocessInput<'a> {
    PostprocessInput {
        candidate: input.candidate,
        target_sentence_count: input.target_sentence_count,
        target_question_count: input.target_question_count,
        target_max_length: input.target_max_length,
        is_sexual: input.is_sexual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;
    use persona_llm::ComposerInput;

    fn postprocess_input() -> PostprocessInput<'static> {
        PostprocessInput { candidate: "", target_sentence_count: None, target_question_count: 1, target_max_length: 220, is_sexual: false }
    }

    #[tokio::test]
    async fn fallback_mode_issues_single_generation() {
        let mut caps = test_capabilities();
        caps.llm = Arc::new(crate::test_support::MockLlm::with_text(
            "Na das klingt doch richtig spannend bei dir, erzähl mir gern noch etwas mehr davon, das würde mich wirklich interessieren?",
        ));
        let bb = Blackboard::new();
        let composer = ComposerInput { final_instructions_block: "Antworte freundlich.".to_string(), ..Default::default() };
        let result = run(
            &caps,
            &bb,
            "Hallo",
            GeneratorInput {
                model: "gpt",
                composer: &composer,
                reference_texts: &[],
                good_patterns: &[],
                has_learning_data: false,
                fallback_mode: false,
                postprocess: postprocess_input(),
            },
        )
        .await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn multi_candidate_path_picks_a_winner_when_learning_data_available() {
        let mut caps = test_capabilities();
        caps.llm = Arc::new(crate::test_support::MockLlm::with_text(
            "Na das klingt doch richtig spannend bei dir, erzähl mir gern noch etwas mehr davon, das würde mich wirklich interessieren?",
        ));
        let bb = Blackboard::new();
        let composer = ComposerInput { final_instructions_block: "Antworte freundlich.".to_string(), ..Default::default() };
        let result = run(
            &caps,
            &bb,
            "Was machst du so?",
            GeneratorInput {
                model: "gpt",
                composer: &composer,
                reference_texts: &["Na was machst du heute so Schönes, erzähl mal.".to_string()],
                good_patterns: &[("Na das klingt spannend, erzähl mir mehr.".to_string(), 0.8)],
                has_learning_data: true,
                fallback_mode: false,
                postprocess: postprocess_input(),
            },
        )
        .await;
        assert!(result.success);
        assert!(!result.message.is_empty());
    }
}
