//! Capability interfaces (§6 of spec.md). Each is an external collaborator
//! with a narrow, specified interface; the orchestration engine only ever
//! depends on these traits, never on a concrete provider.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::request::HistoryMessage;

/// `llm.complete` / `llm.complete_json`.
#[async_trait]
pub trait LlmCompletion: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;

    /// Same call, with JSON-object response enforcement. Implementations
    /// must tolerate a fenced ` ```json ` prefix in the raw completion.
    async fn complete_json(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Value>;
}

/// `embed(text) -> vector`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone)]
pub struct VectorSearchParams {
    pub top_k: usize,
    pub min_similarity: f32,
    pub situation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VectorSearchHit {
    pub example: crate::example::Example,
    pub similarity: f32,
}

/// `vector_search(query_text, {top_k, min_similarity, situation?}) -> [example]`.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(
        &self,
        query_text: &str,
        params: VectorSearchParams,
    ) -> Result<Vec<VectorSearchHit>>;
}

#[derive(Debug, Clone)]
pub struct ModerationResult {
    pub is_blocked: bool,
    pub reason: Option<String>,
    pub error_message: Option<String>,
}

/// `moderation(text) -> {is_blocked, reason, error_message}`.
#[async_trait]
pub trait Moderation: Send + Sync {
    async fn check(&self, text: &str) -> Result<ModerationResult>;
}

#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub image_type: String,
    pub description: String,
    pub reaction_needed: bool,
}

/// `image_analyze(url, context) -> {image_type, description, reaction_needed?}`.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str, context: &str) -> Result<ImageAnalysis>;
}

/// `city.find_nearby(city_name) -> city_name?`.
#[async_trait]
pub trait CityLookup: Send + Sync {
    async fn find_nearby(&self, city_name: &str) -> Result<Option<String>>;
}

/// `is_meeting_request(message, history) -> bool`.
pub trait MeetingRequestClassifier: Send + Sync {
    fn is_meeting_request(&self, message: &str, history: &[HistoryMessage]) -> bool;
}

/// `is_location_question(message) -> bool`.
pub trait LocationQuestionClassifier: Send + Sync {
    fn is_location_question(&self, message: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct WritingStyleFeatures {
    pub mean_sentence_length_words: f32,
    pub mean_sentence_count: f32,
    pub comma_rate: f32,
    pub question_mark_rate: f32,
    pub period_rate: f32,
    pub exclamation_rate: f32,
    pub common_sentence_starts: Vec<String>,
    pub dominant_formality: Formality,
    pub dominant_directness: Directness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formality {
    #[default]
    Informal,
    Formal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Directness {
    Direct,
    #[default]
    Indirect,
}

/// `writing_style(messages) -> {...}`.
pub trait WritingStyleAnalyzer: Send + Sync {
    fn analyze(&self, messages: &[String]) -> WritingStyleFeatures;
}

/// `is_info_message(message) -> bool` — true for system notices like
/// "has liked you" / "has kissed you" rather than free-text chat turns.
pub trait InfoMessageClassifier: Send + Sync {
    fn is_info_message(&self, message: &str) -> bool;
}
