use serde::{Deserialize, Serialize};

/// A training example or feedback-log entry, for either the normal
/// (moderator-response) flow or the ASA (reactivation) flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Example {
    /// Stable id, when the source record had one (training JSON, feedback log).
    #[serde(default)]
    pub id: Option<String>,
    pub customer_message: String,
    /// The persona's reply for the normal flow. ASA examples use `asa_message`
    /// instead; exactly one of the two is populated depending on provenance.
    #[serde(default)]
    pub moderator_response: Option<String>,
    #[serde(default)]
    pub asa_message: Option<String>,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub is_negative_example: bool,
}

impl Example {
    /// The reply text regardless of which field it lives in.
    pub fn response_text(&self) -> &str {
        self.asa_message
            .as_deref()
            .or(self.moderator_response.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingData {
    #[serde(default)]
    pub conversations: Vec<Example>,
    #[serde(default, rename = "asaExamples")]
    pub asa_examples: Vec<Example>,
}

/// Outcome label attached to a past generation in the feedback log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackOutcome {
    Good,
    Bad,
    Edited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub example: Example,
    pub outcome: FeedbackOutcome,
    #[serde(default)]
    pub edited_text: Option<String>,
    #[serde(default)]
    pub contextual_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackData {
    #[serde(default)]
    pub feedbacks: Vec<FeedbackEntry>,
}
