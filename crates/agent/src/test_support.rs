//! Mock capability implementations used only by this crate's own unit
//! tests. Not part of the public API; `persona-tools` carries the real
//! default adapters used at wiring time.
#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use persona_core::{
    Capabilities, CityLookup, Directness, Embedder, Formality, HistoryMessage, ImageAnalysis,
    ImageAnalyzer, InfoMessageClassifier, LlmCompletion, LocationQuestionClassifier,
    MeetingRequestClassifier, Moderation, ModerationResult, Result, VectorSearch,
    VectorSearchHit, VectorSearchParams, WritingStyleAnalyzer, WritingStyleFeatures,
};

pub struct MockLlm {
    pub text: Mutex<String>,
    pub json: Mutex<serde_json::Value>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self { text: Mutex::new("Na, was machst du heute so Schönes?".to_string()), json: Mutex::new(serde_json::json!({})) }
    }
}

impl MockLlm {
    pub fn with_json(value: serde_json::Value) -> Self {
        Self { text: Mutex::new(String::new()), json: Mutex::new(value) }
    }

    pub fn with_text(text: &str) -> Self {
        Self { text: Mutex::new(text.to_string()), json: Mutex::new(serde_json::json!({})) }
    }
}

#[async_trait]
impl LlmCompletion for MockLlm {
    async fn complete(&self, _model: &str, _system: &str, _user: &str, _temperature: f32, _max_tokens: u32) -> Result<String> {
        Ok(self.text.lock().clone())
    }

    async fn complete_json(&self, _model: &str, _system: &str, _user: &str, _temperature: f32, _max_tokens: u32) -> Result<serde_json::Value> {
        Ok(self.json.lock().clone())
    }
}

pub struct MockEmbedder;

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let hash = md5::compute(text.as_bytes());
        Ok(hash.0.iter().map(|b| *b as f32 / 255.0).collect())
    }
}

pub struct MockVectorSearch {
    pub hits: Vec<VectorSearchHit>,
}

#[async_trait]
impl VectorSearch for MockVectorSearch {
    async fn search(&self, _query_text: &str, _params: VectorSearchParams) -> Result<Vec<VectorSearchHit>> {
        Ok(self.hits.clone())
    }
}

pub struct MockModeration;

#[async_trait]
impl Moderation for MockModeration {
    async fn check(&self, _text: &str) -> Result<ModerationResult> {
        Ok(ModerationResult { is_blocked: false, reason: None, error_message: None })
    }
}

pub struct MockBlockingModeration {
    pub reason: String,
}

#[async_trait]
impl Moderation for MockBlockingModeration {
    async fn check(&self, _text: &str) -> Result<ModerationResult> {
        Ok(ModerationResult { is_blocked: true, reason: Some(self.reason.clone()), error_message: None })
    }
}

pub struct MockImageAnalyzer;

#[async_trait]
impl ImageAnalyzer for MockImageAnalyzer {
    async fn analyze(&self, _url: &str, _context: &str) -> Result<ImageAnalysis> {
        Ok(ImageAnalysis { image_type: "selfie".to_string(), description: String::new(), reaction_needed: false })
    }
}

pub struct MockCityLookup;

#[async_trait]
impl CityLookup for MockCityLookup {
    async fn find_nearby(&self, _city_name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

pub struct MockMeetingClassifier(pub bool);

impl MeetingRequestClassifier for MockMeetingClassifier {
    fn is_meeting_request(&self, _message: &str, _history: &[HistoryMessage]) -> bool {
        self.0
    }
}

pub struct MockLocationClassifier(pub bool);

impl LocationQuestionClassifier for MockLocationClassifier {
    fn is_location_question(&self, _message: &str) -> bool {
        self.0
    }
}

pub struct MockWritingStyle;

impl WritingStyleAnalyzer for MockWritingStyle {
    fn analyze(&self, _messages: &[String]) -> WritingStyleFeatures {
        WritingStyleFeatures {
            mean_sentence_length_words: 8.0,
            mean_sentence_count: 2.0,
            comma_rate: 0.02,
            question_mark_rate: 0.01,
            period_rate: 0.02,
            exclamation_rate: 0.0,
            common_sentence_starts: vec!["Na du".to_string()],
            dominant_formality: Formality::Informal,
            dominant_directness: Directness::Direct,
        }
    }
}

pub struct MockInfoMessage(pub bool);

impl InfoMessageClassifier for MockInfoMessage {
    fn is_info_message(&self, _message: &str) -> bool {
        self.0
    }
}

pub fn test_capabilities() -> Capabilities {
    Capabilities {
        llm: Arc::new(MockLlm::default()),
        embedder: Arc::new(MockEmbedder),
        vector_search: Arc::new(MockVectorSearch { hits: vec![] }),
        moderation: Arc::new(MockModeration),
        image_analyzer: Arc::new(MockImageAnalyzer),
        city_lookup: Arc::new(MockCityLookup),
        meeting_classifier: Arc::new(MockMeetingClassifier(false)),
        location_classifier: Arc::new(MockLocationClassifier(false)),
        writing_style: Arc::new(MockWritingStyle),
        info_message_classifier: Arc::new(MockInfoMessage(false)),
    }
}
