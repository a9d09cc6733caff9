//! Hybrid re-ranking (step 4-7 of the retrieval algorithm): combine
//! semantic similarity, learned feedback performance and contextual
//! relevance into one score, with adaptive weighting by how much
//! feedback signal the candidate set actually carries.

use persona_core::{LearningStatistics, VectorSearchHit};

use persona_config::constants::retrieval::{
    FALLBACK_MODE_EXAMPLES_BLOCK_MIN_CHARS, FALLBACK_MODE_EXAMPLE_INTEL_THRESHOLD,
    FALLBACK_MODE_SEMANTIC_THRESHOLD, GOOD_FEEDBACK_RATIO_HIGH, GOOD_FEEDBACK_RATIO_LOW,
    WEIGHTS_HIGH_FEEDBACK, WEIGHTS_LOW_FEEDBACK, WEIGHTS_MID_FEEDBACK,
};

#[derive(Debug, Clone)]
pub struct RerankContext<'a> {
    pub situation: Option<&'a str>,
    pub topic_keywords: &'a [String],
    /// Precomputed similarity of the candidate's customer message to the
    /// current customer message, used for the message-pattern-feedback
    /// contribution. `None` when no comparison was made.
    pub message_pattern_similarity: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub hit: VectorSearchHit,
    pub semantic: f32,
    pub feedback: f32,
    pub context_relevance: f32,
    pub hybrid: f32,
}

fn feedback_component(hit: &VectorSearchHit, stats: &LearningStatistics, situation: Option<&str>) -> f32 {
    let Some(id) = &hit.example.id else { return 0.5 };
    let situation = situation.or(hit.example.situation.as_deref()).unwrap_or("allgemein");
    let (perf, discount) = stats.example_performance_for(id, situation);
    if perf.total() == 0 {
        return 0.5;
    }
    let normalized = perf.success_rate() * 2.0 - 1.0;
    let mapped = (normalized + 1.0) / 2.0;
    0.5 + (mapped - 0.5) * discount
}

fn context_relevance_component(
    hit: &VectorSearchHit,
    stats: &LearningStatistics,
    ctx: &RerankContext,
) -> f32 {
    let mut score = 0.5_f32;

    let matches_situation = match (ctx.situation, &hit.example.situation) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    if matches_situation {
        score += 0.3;
        let situation = ctx.situation.unwrap();
        if let Some(id) = &hit.example.id {
            let (perf, _) = stats.example_performance_for(id, situation);
            if perf.total() > 0 {
                score += perf.success_rate() * 0.2;
            }
        }
    }

    if !ctx.topic_keywords.is_empty() {
        let message = hit.example.customer_message.to_lowercase();
        if ctx.topic_keywords.iter().any(|k| message.contains(&k.to_lowercase())) {
            score += 0.15;
        }
    }

    if let Some(similarity) = ctx.message_pattern_similarity {
        score += similarity.clamp(0.0, 1.0) * 0.1;
    }

    score.min(1.0)
}

/// The good-feedback ratio across `hits`: the share whose stored
/// performance (exact or "allgemein") has at least one recorded outcome.
fn good_feedback_ratio(hits: &[VectorSearchHit], stats: &LearningStatistics, situation: Option<&str>) -> f32 {
    if hits.is_empty() {
        return 0.0;
    }
    let with_signal = hits
        .iter()
        .filter(|h| {
            let Some(id) = &h.example.id else { return false };
            let situation = situation.or(h.example.situation.as_deref()).unwrap_or("allgemein");
            stats.example_performance_for(id, situation).0.total() > 0
        })
        .count();
    with_signal as f32 / hits.len() as f32
}

fn adaptive_weights(good_ratio: f32) -> (f32, f32, f32) {
    if good_ratio > GOOD_FEEDBACK_RATIO_HIGH {
        WEIGHTS_HIGH_FEEDBACK
    } else if good_ratio < GOOD_FEEDBACK_RATIO_LOW {
        WEIGHTS_LOW_FEEDBACK
    } else {
        WEIGHTS_MID_FEEDBACK
    }
}

/// Scores and sorts `hits` descending by hybrid score, taking the top
/// `selection_top_k`.
pub fn rerank(
    hits: Vec<VectorSearchHit>,
    stats: &LearningStatistics,
    ctx: &RerankContext,
    selection_top_k: usize,
) -> Vec<ScoredHit> {
    let good_ratio = good_feedback_ratio(&hits, stats, ctx.situation);
    let (w_s, w_f, w_c) = adaptive_weights(good_ratio);

    let mut scored: Vec<ScoredHit> = hits
        .into_iter()
        .map(|hit| {
            let semantic = hit.similarity.clamp(0.0, 1.0);
            let feedback = feedback_component(&hit, stats, ctx.situation);
            let context_relevance = context_relevance_component(&hit, stats, ctx);
            let hybrid = w_s * semantic + w_f * feedback + w_c * context_relevance;
            ScoredHit { hit, semantic, feedback, context_relevance, hybrid }
        })
        .collect();

    scored.sort_by(|a, b| b.hybrid.partial_cmp(&a.hybrid).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(selection_top_k);
    scored
}

/// Whether the retrieval result is thin enough to trigger fallback mode:
/// no good semantic or example-intelligence match, not a first message,
/// not ASA, and the eventual examples block would be short.
pub fn is_fallback_mode(
    best_semantic: f32,
    best_example_intel_similarity: f32,
    is_first_message: bool,
    is_asa: bool,
    examples_block_len: usize,
) -> bool {
    !is_first_message
        && !is_asa
        && best_semantic < FALLBACK_MODE_SEMANTIC_THRESHOLD
        && best_example_intel_similarity < FALLBACK_MODE_EXAMPLE_INTEL_THRESHOLD
        && examples_block_len < FALLBACK_MODE_EXAMPLES_BLOCK_MIN_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::Example;

    fn hit(id: &str, situation: &str, similarity: f32) -> VectorSearchHit {
        VectorSearchHit {
            example: Example {
                id: Some(id.to_string()),
                customer_message: "Hast du Lust auf ein Treffen?".to_string(),
                moderator_response: Some("Lass uns erstmal weiter schreiben.".to_string()),
                asa_message: None,
                situation: Some(situation.to_string()),
                explanation: None,
                is_negative_example: false,
            },
            similarity,
        }
    }

    #[test]
    fn neutral_feedback_when_no_stats_recorded() {
        let stats = LearningStatistics::default();
        let h = hit("1", "Treffen/Termine", 0.9);
        assert_eq!(feedback_component(&h, &stats, Some("Treffen/Termine")), 0.5);
    }

    #[test]
    fn ranks_by_hybrid_descending() {
        let stats = LearningStatistics::default();
        let hits = vec![hit("1", "Treffen/Termine", 0.2), hit("2", "Treffen/Termine", 0.95)];
        let ctx = RerankContext { situation: Some("Treffen/Termine"), topic_keywords: &[], message_pattern_similarity: None };
        let scored = rerank(hits, &stats, &ctx, 15);
        assert_eq!(scored[0].hit.example.id.as_deref(), Some("2"));
    }

    #[test]
    fn fallback_mode_requires_all_conditions() {
        assert!(is_fallback_mode(0.4, 0.3, false, false, 200));
        assert!(!is_fallback_mode(0.8, 0.3, false, false, 200));
        assert!(!is_fallback_mode(0.4, 0.3, true, false, 200));
        assert!(!is_fallback_mode(0.4, 0.3, false, true, 200));
        assert!(!is_fallback_mode(0.4, 0.3, false, false, 600));
    }
}
