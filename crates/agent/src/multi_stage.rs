//! Multi-Stage Pipeline (C11, spec.md §4.11): the alternative
//! orchestration used for fine-tuned backends. Four LLM calls instead of
//! the full layered DAG — planning, example selection, generation,
//! validation/correction.

use persona_core::{Capabilities, EngineRequest, LocationQuestionError, Situation};
use persona_llm::prompt::finetuned::{compose_finetuned, FinetunedComposerInput};
use persona_rag::{retrieve, AsaNoRepeatTracker, RetrievalInput};

const SEXUAL_LENGTH_CEILING: usize = 250;
const NON_SEXUAL_LENGTH_CEILING: usize = 300;

#[derive(Debug, Clone, Default)]
pub struct PlanningResult {
    pub topic: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub detected_situations: Vec<Situation>,
    pub critical_instructions: Vec<String>,
    pub new_information: Vec<String>,
    pub open_questions: Vec<String>,
    pub is_ongoing_conversation: bool,
    pub is_sexual: bool,
    pub image_instruction: Option<String>,
}

fn string_list(raw: &serde_json::Value, field: &str) -> Vec<String> {
    raw.get(field)
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// Stage 1: plan topic/situations/open-questions from one LLM call.
/// Location questions and image context are resolved inline; a
/// location question that cannot be resolved short-circuits the whole
/// pipeline with a handoff error.
pub async fn plan(
    capabilities: &Capabilities,
    model: &str,
    request: &EngineRequest,
) -> Result<PlanningResult, LocationQuestionError> {
    if capabilities.location_classifier.is_location_question(&request.customer_message) {
        match capabilities.city_lookup.find_nearby(&request.profile_info.city.clone().unwrap_or_default()).await {
            Ok(Some(city)) => {
                let mut plan = run_planning_llm(capabilities, model, request).await;
                plan.critical_instructions.push(format!("Nenne bei Bedarf die Stadt {city} als deinen ungefähren Standort."));
                return Ok(plan);
            }
            Ok(None) | Err(_) => {
                return Err(LocationQuestionError {
                    reason: "no resolvable city for location question".to_string(),
                    customer_message: request.customer_message.clone(),
                });
            }
        }
    }

    Ok(run_planning_llm(capabilities, model, request).await)
}

async fn run_planning_llm(capabilities: &Capabilities, model: &str, request: &EngineRequest) -> PlanningResult {
    let system = "Du analysierst eine Chat-Nachricht für einen Dating-Plattform-Moderator. Antworte als JSON mit \
        topic, summary, key_points (Liste), detected_situations (Liste), critical_instructions (Liste), \
        new_information (Liste), open_questions (Liste), is_ongoing_conversation (bool), is_sexual (bool).";
    let user = format!(
        "Verlauf:\n{}\n\nAktuelle Nachricht: \"{}\"",
        request.conversation_history, request.customer_message
    );

    let mut plan = match capabilities.llm.complete_json(model, system, &user, 0.0, 400).await {
        Ok(raw) => PlanningResult {
            topic: raw.get("topic").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            summary: raw.get("summary").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            key_points: string_list(&raw, "key_points"),
            detected_situations: string_list(&raw, "detected_situations").into_iter().map(Situation).collect(),
            critical_instructions: string_list(&raw, "critical_instructions"),
            new_information: string_list(&raw, "new_information"),
            open_questions: string_list(&raw, "open_questions"),
            is_ongoing_conversation: raw.get("is_ongoing_conversation").and_then(|v| v.as_bool()).unwrap_or(false),
            is_sexual: raw.get("is_sexual").and_then(|v| v.as_bool()).unwrap_or(false),
            image_instruction: None,
        },
        Err(_) => PlanningResult::default(),
    };

    if let Some(image_url) = &request.image_url {
        if let Ok(analysis) = capabilities.image_analyzer.analyze(image_url, &request.customer_message).await {
            if analysis.reaction_needed {
                plan.image_instruction = Some(format!("Reagiere kurz auf das Bild ({}).", analysis.description));
            }
        }
    }

    plan
}

/// Stage 2: vector search with the Stage-1 situations, then one LLM call
/// picks the best 1-2 examples. ASA bypasses this stage (uses C6's
/// random draw).
pub async fn select_examples(
    capabilities: &Capabilities,
    model: &str,
    request: &EngineRequest,
    plan: &PlanningResult,
    asa_tracker: &AsaNoRepeatTracker,
) -> Vec<String> {
    let retrieval = retrieve(RetrievalInput {
        customer_message: &request.customer_message,
        topic: &plan.topic,
        key_points: &plan.key_points.join(", "),
        situations: &plan.detected_situations,
        topic_keywords: &[],
        is_asa: request.flags.is_asa,
        is_first_message: request.is_first_contact_from_us(),
        persona_id: &request.persona_id,
        asa_examples: &request.training_data.asa_examples,
        vector_search: capabilities.vector_search.clone(),
        learning_stats: request.learning_stats.as_ref(),
        asa_tracker,
        example_intel_best_similarity: 0.0,
    })
    .await;

    let Ok(retrieval) = retrieval else { return vec![] };
    if request.flags.is_asa || retrieval.examples.is_empty() {
        return retrieval.examples.iter().map(|e| e.response_text().to_string()).collect();
    }

    let candidates: Vec<String> = retrieval.examples.iter().take(10).map(|e| e.response_text().to_string()).collect();
    let system = "Wähle aus den folgenden Beispielantworten die 1-2 besten aus (Qualität vor Quantität). \
        Antworte als JSON mit picked (Liste von Strings, exakte Kopien der gewählten Beispiele).";
    let user = format!("Beispiele:\n{}", candidates.iter().enumerate().map(|(i, c)| format!("{i}: {c}")).collect::<Vec<_>>().join("\n"));

    match capabilities.llm.complete_json(model, system, &user, 0.0, 300).await {
        Ok(raw) => {
            let picked = string_list(&raw, "picked");
            if picked.is_empty() {
                candidates.into_iter().take(2).collect()
            } else {
                picked.into_iter().take(2).collect()
            }
        }
        Err(_) => candidates.into_iter().take(2).collect(),
    }
}

/// Stage 3: the minimal fine-tuned-backend prompt, last 6 turns plus a
/// one-shot example.
pub async fn generate(
    capabilities: &Capabilities,
    model: &str,
    request: &EngineRequest,
    plan: &PlanningResult,
    examples: &[String],
    hard_rules: &str,
) -> Option<String> {
    let mut rules = hard_rules.to_string();
    for instruction in &plan.critical_instructions {
        rules.push('\n');
        rules.push_str(instruction);
    }
    if let Some(image_instruction) = &plan.image_instruction {
        rules.push('\n');
        rules.push_str(image_instruction);
    }

    let one_shot_example = examples.first().map(|e| (String::new(), e.clone()));
    let last_moderator = request.moderator_messages.last().map(|m| m.text.clone()).unwrap_or_default();

    let input = FinetunedComposerInput {
        hard_rules: rules,
        last_moderator_message: last_moderator,
        last_customer_message: request.customer_message.clone(),
        one_shot_example,
    };
    let (system, user) = compose_finetuned(&input);

    capabilities.llm.complete(model, &system, &user, 0.6, 300).await.ok()
}

/// Stage 4: validate the generated reply against the Stage-1 plan and
/// apply structural fixups. Sexual conversations only get structural
/// post-fixes, never a semantic rewrite.
pub async fn validate_and_correct(
    capabilities: &Capabilities,
    model: &str,
    plan: &PlanningResult,
    generated: String,
    is_asa: bool,
) -> String {
    let mut message = generated;

    if !plan.is_sexual {
        let mentions_meeting = message.to_lowercase().contains("treffen");
        if mentions_meeting {
            let system = "Entferne den Satz, der ein Treffen vorschlägt oder zusagt, aus der folgenden Antwort. \
                Gib nur die korrigierte Antwort zurück.";
            if let Ok(corrected) = capabilities.llm.complete(model, system, &message, 0.0, 300).await {
                if !corrected.trim().is_empty() {
                    message = corrected;
                }
            }
        }
    }

    if !is_asa && !message.trim_end().ends_with('?') {
        let system = "Füge der folgenden Antwort eine kurze, thematisch passende Frage am Ende hinzu. \
            Gib nur die vollständige Antwort zurück.";
        if let Ok(with_question) = capabilities.llm.complete(model, system, &message, 0.3, 300).await {
            if !with_question.trim().is_empty() {
                message = with_question;
            }
        }
    }

    let ceiling = if plan.is_sexual { SEXUAL_LENGTH_CEILING } else { NON_SEXUAL_LENGTH_CEILING };
    if message.chars().count() > ceiling {
        message = message.chars().take(ceiling).collect();
        if let Some(pos) = message.rfind(['.', '?']) {
            message.truncate(pos + 1);
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;
    use persona_core::HistoryMessage;

    fn request() -> EngineRequest {
        EngineRequest {
            persona_id: "persona-1".to_string(),
            customer_message: "Wie geht's dir?".to_string(),
            conversation_history: String::new(),
            moderator_messages: vec![HistoryMessage { text: "Na du?".to_string(), timestamp: None }],
            customer_messages: vec![],
            profile_info: Default::default(),
            extracted_user_info: Default::default(),
            rules: Default::default(),
            training_data: Default::default(),
            feedback_data: None,
            learning_stats: std::sync::Arc::new(Default::default()),
            image_url: None,
            image_type: None,
            image_description: None,
            flags: Default::default(),
            capabilities: test_capabilities(),
        }
    }

    #[tokio::test]
    async fn plan_short_circuits_on_unresolvable_location_question() {
        let mut req = request();
        req.capabilities.location_classifier = std::sync::Arc::new(crate::test_support::MockLocationClassifier(true));
        req.capabilities.city_lookup = std::sync::Arc::new(crate::test_support::MockCityLookup);
        let caps = req.capabilities.clone();
        let result = plan(&caps, "gpt", &req).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn plan_succeeds_without_location_question() {
        let req = request();
        let caps = req.capabilities.clone();
        let result = plan(&caps, "gpt", &req).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn validate_and_correct_appends_question_for_non_asa() {
        let caps = test_capabilities();
        let plan = PlanningResult::default();
        let result = validate_and_correct(&caps, "gpt", &plan, "Na das war aber ein schöner Tag heute.".to_string(), false).await;
        assert!(!result.is_empty());
    }

    #[tokio::test]
    async fn validate_and_correct_enforces_length_ceiling() {
        let caps = test_capabilities();
        let mut plan = PlanningResult::default();
        plan.is_sexual = true;
        let long_text = "Na. ".repeat(100);
        let result = validate_and_correct(&caps, "gpt", &plan, long_text, true).await;
        assert!(result.chars().count() <= SEXUAL_LENGTH_CEILING);
    }
}
