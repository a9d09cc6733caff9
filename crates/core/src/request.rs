use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::example::TrainingData;
use crate::learning::LearningStatistics;
use crate::profile::{ExtractedUserInfo, ProfileInfo, RulesBundle};
use crate::traits::{
    CityLookup, Embedder, ImageAnalyzer, InfoMessageClassifier, LlmCompletion,
    LocationQuestionClassifier, MeetingRequestClassifier, Moderation, VectorSearch,
    WritingStyleAnalyzer,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformId {
    Default,
}

/// Request-level flags (spec.md §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestFlags {
    #[serde(default)]
    pub is_asa: bool,
    #[serde(default)]
    pub platform_id: String,
    #[serde(default)]
    pub asa_conversation_context: String,
}

/// The dependency-injected capability bag (spec.md §3 "capabilities").
/// Not `Serialize`/`Deserialize` — constructed by the caller (typically
/// `persona-server`) and threaded through the pipeline by reference.
#[derive(Clone)]
pub struct Capabilities {
    pub llm: Arc<dyn LlmCompletion>,
    pub embedder: Arc<dyn Embedder>,
    pub vector_search: Arc<dyn VectorSearch>,
    pub moderation: Arc<dyn Moderation>,
    pub image_analyzer: Arc<dyn ImageAnalyzer>,
    pub city_lookup: Arc<dyn CityLookup>,
    pub meeting_classifier: Arc<dyn MeetingRequestClassifier>,
    pub location_classifier: Arc<dyn LocationQuestionClassifier>,
    pub writing_style: Arc<dyn WritingStyleAnalyzer>,
    pub info_message_classifier: Arc<dyn InfoMessageClassifier>,
}

/// The full inbound request (spec.md §3 / §6).
#[derive(Clone)]
pub struct EngineRequest {
    /// Stable identifier for the persona/fake-profile driving this
    /// conversation. Not part of spec.md's wire shape (§6) but needed to
    /// key the ASA no-repeat-back-to-back LRU (spec.md §9 Design Notes)
    /// and per-request tracing spans; the caller derives it from
    /// whatever persona-identity scheme the platform integration uses.
    pub persona_id: String,
    pub customer_message: String,
    pub conversation_history: String,
    pub moderator_messages: Vec<HistoryMessage>,
    pub customer_messages: Vec<HistoryMessage>,
    pub profile_info: ProfileInfo,
    pub extracted_user_info: ExtractedUserInfo,
    pub rules: RulesBundle,
    pub training_data: TrainingData,
    pub feedback_data: Option<crate::example::FeedbackData>,
    /// Derived/cached statistics (spec.md §3 "Learning Statistics"),
    /// loaded out-of-band by the persistence layer and handed in
    /// alongside the request rather than recomputed per-request; the
    /// blackboard's `learning_stats` slot (C1) is just this handle.
    pub learning_stats: Arc<LearningStatistics>,
    pub image_url: Option<String>,
    pub image_type: Option<String>,
    pub image_description: Option<String>,
    pub flags: RequestFlags,
    pub capabilities: Capabilities,
}

impl EngineRequest {
    /// True iff history is empty or contains only info-type messages, and
    /// the inbound customer message is empty (spec.md §4.5 First-Message Detector).
    pub fn is_first_contact_from_us(&self) -> bool {
        if !self.customer_message.trim().is_empty() {
            return false;
        }
        if self.moderator_messages.is_empty() && self.customer_messages.is_empty() {
            return true;
        }
        self.customer_messages
            .iter()
            .all(|m| self.capabilities.info_message_classifier.is_info_message(&m.text))
    }
}
