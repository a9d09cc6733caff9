//! Top-level retrieval orchestration tying together query construction,
//! vector search, the ASA short-circuit and hybrid re-ranking.

use std::sync::Arc;

use persona_core::{
    Example, LearningStatistics, Result, Situation, VectorSearch, VectorSearchParams,
};

use persona_config::constants::retrieval::{
    GENERAL_MIN_SIMILARITY, GENERAL_TOP_K, MEETING_SITUATION_TOP_K, MEETING_UNFILTERED_TOP_K,
    NORMAL_SELECTION_TOP_K,
};

use crate::asa_selector::{select_asa_example, AsaNoRepeatTracker};
use crate::reranker::{is_fallback_mode, rerank, RerankContext};

pub struct RetrievalInput<'a> {
    pub customer_message: &'a str,
    pub topic: &'a str,
    pub key_points: &'a str,
    pub situations: &'a [Situation],
    pub topic_keywords: &'a [String],
    pub is_asa: bool,
    pub is_first_message: bool,
    pub persona_id: &'a str,
    pub asa_examples: &'a [Example],
    pub vector_search: Arc<dyn VectorSearch>,
    pub learning_stats: &'a LearningStatistics,
    pub asa_tracker: &'a AsaNoRepeatTracker,
    /// Best example-intelligence similarity computed upstream, used only
    /// for the fallback-mode check.
    pub example_intel_best_similarity: f32,
}

pub struct RetrievalOutput {
    pub examples: Vec<Example>,
    /// Hybrid re-ranking score per entry in `examples`, same order (C6
    /// §4.6 step 5). `1.0` for the single ASA draw, which bypasses
    /// scoring entirely and is always used near-verbatim.
    pub similarities: Vec<f32>,
    pub fallback_mode: bool,
}

pub async fn retrieve(input: RetrievalInput<'_>) -> Result<RetrievalOutput> {
    if input.is_asa {
        let examples: Vec<Example> = select_asa_example(
            input.persona_id,
            input.asa_examples,
            input.learning_stats,
            input.asa_tracker,
        )
        .into_iter()
        .cloned()
        .collect();
        let similarities = vec![1.0; examples.len()];
        return Ok(RetrievalOutput { examples, similarities, fallback_mode: false });
    }

    let query = crate::query::build_query(input.topic, input.key_points, input.customer_message, input.situations);
    let is_meeting = input.situations.iter().any(|s| s.as_str() == Situation::TREFFEN);

    let hits = if is_meeting {
        let meeting_params = VectorSearchParams {
            top_k: MEETING_SITUATION_TOP_K,
            min_similarity: 0.0,
            situation: Some(Situation::TREFFEN.to_string()),
        };
        let unfiltered_params = VectorSearchParams { top_k: MEETING_UNFILTERED_TOP_K, min_similarity: 0.0, situation: None };
        let (meeting_hits, unfiltered_hits) = tokio::try_join!(
            input.vector_search.search(&query, meeting_params),
            input.vector_search.search(&query, unfiltered_params),
        )?;
        let mut combined = meeting_hits;
        combined.extend(unfiltered_hits);
        combined
    } else {
        let params = VectorSearchParams { top_k: GENERAL_TOP_K, min_similarity: GENERAL_MIN_SIMILARITY, situation: None };
        input.vector_search.search(&query, params).await?
    };

    let best_semantic = hits.iter().map(|h| h.similarity).fold(0.0_f32, f32::max);

    let rerank_ctx = RerankContext {
        situation: input.situations.first().map(|s| s.as_str()),
        topic_keywords: input.topic_keywords,
        message_pattern_similarity: None,
    };
    let scored = rerank(hits, input.learning_stats, &rerank_ctx, NORMAL_SELECTION_TOP_K);

    let (examples, similarities): (Vec<Example>, Vec<f32>) =
        scored.into_iter().map(|s| (s.hit.example, s.hybrid)).unzip();
    let examples_block_len: usize = examples.iter().map(|e| e.response_text().len()).sum();

    let fallback_mode = is_fallback_mode(
        best_semantic,
        input.example_intel_best_similarity,
        input.is_first_message,
        input.is_asa,
        examples_block_len,
    );

    Ok(RetrievalOutput { examples, similarities, fallback_mode })
}
