//! HTTP surface: one reply-generation endpoint plus health/readiness
//! checks. The request body mirrors `EngineRequest`'s caller-supplied
//! fields (everything except `rules`/`training_data`/`learning_stats`,
//! which come from the persisted snapshot, and `capabilities`, which are
//! process-wide); the response body is `EngineResponse` verbatim.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use persona_core::{EngineRequest, ExtractedUserInfo, FeedbackData, HistoryMessage, ProfileInfo, RequestFlags};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/reply", post(generate_reply))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ReplyRequest {
    persona_id: String,
    customer_message: String,
    #[serde(default)]
    conversation_history: String,
    #[serde(default)]
    moderator_messages: Vec<HistoryMessage>,
    #[serde(default)]
    customer_messages: Vec<HistoryMessage>,
    #[serde(default)]
    profile_info: ProfileInfo,
    #[serde(default)]
    extracted_user_info: ExtractedUserInfo,
    #[serde(default)]
    feedback_data: Option<FeedbackData>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image_type: Option<String>,
    #[serde(default)]
    image_description: Option<String>,
    #[serde(default)]
    flags: RequestFlags,
}

/// Generates one reply for an inbound chat message. Builds the
/// `EngineRequest` from the persisted snapshot plus the request body and
/// delegates entirely to `persona_agent::run`; never itself interprets
/// `EngineResponse` (spec.md §1, "the HTTP transport layer" stays thin).
async fn generate_reply(State(state): State<AppState>, Json(body): Json<ReplyRequest>) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("reply_request", request_id = %request_id, is_asa = body.flags.is_asa);
    let _enter = span.enter();

    let request = EngineRequest {
        persona_id: body.persona_id,
        customer_message: body.customer_message,
        conversation_history: body.conversation_history,
        moderator_messages: body.moderator_messages,
        customer_messages: body.customer_messages,
        profile_info: body.profile_info,
        extracted_user_info: body.extracted_user_info,
        rules: (*state.store.rules()).clone(),
        training_data: (*state.store.training_data()).clone(),
        feedback_data: body.feedback_data,
        learning_stats: state.store.learning_stats(),
        image_url: body.image_url,
        image_type: body.image_type,
        image_description: body.image_description,
        flags: body.flags,
        capabilities: state.capabilities.clone(),
    };

    let started = std::time::Instant::now();
    let response = persona_agent::run(
        &request,
        state.llm_factory.model_name(),
        state.llm_factory.is_fine_tuned_backend(),
        &state.asa_tracker,
    )
    .await;
    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, success = response.success, "reply generated");

    Json(response)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let rules = state.store.rules();
    let has_rules = !rules.forbidden_words.is_empty() || !rules.situational_responses.is_empty();
    let status = if state.settings.environment.is_strict() && !has_rules { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::OK };
    (status, Json(serde_json::json!({ "status": if status == StatusCode::OK { "ready" } else { "not_ready" } })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_config::Settings;

    #[tokio::test]
    async fn router_builds_with_default_settings() {
        let state = AppState::build(Settings::default()).await.unwrap();
        let _ = create_router(state);
    }
}
