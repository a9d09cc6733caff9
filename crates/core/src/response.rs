use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityDetails {
    pub training_data_usage: u32,
    pub context_usage: u32,
    pub rules_compliance: u32,
    pub learning_system_usage: u32,
    pub semantic_validation: u32,
    #[serde(default)]
    pub ml_quality: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationQuestionError {
    pub reason: String,
    pub customer_message: String,
}

/// The outbound response shape (spec.md §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineResponse {
    pub message: String,
    pub success: bool,
    #[serde(default)]
    pub quality_score: Option<u32>,
    #[serde(default)]
    pub quality_details: Option<QualityDetails>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub location_question_error: Option<LocationQuestionError>,
    #[serde(default)]
    pub needs_german_response: Option<bool>,
    #[serde(default)]
    pub german_response: Option<String>,
}

impl EngineResponse {
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            success: false,
            blocked: Some(true),
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn needs_german(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self {
            message: reply.clone(),
            success: true,
            needs_german_response: Some(true),
            german_response: Some(reply),
            ..Default::default()
        }
    }

    pub fn location_handoff(reason: impl Into<String>, customer_message: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            success: false,
            location_question_error: Some(LocationQuestionError {
                reason: reason.into(),
                customer_message: customer_message.into(),
            }),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn success(message: impl Into<String>, quality_score: u32, details: QualityDetails) -> Self {
        Self {
            message: message.into(),
            success: true,
            quality_score: Some(quality_score),
            quality_details: Some(details),
            ..Default::default()
        }
    }
}
