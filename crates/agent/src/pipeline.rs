//! Top-level orchestrator (spec.md §4.5 layer ordering, §5 concurrency
//! model, §8 pipeline contract). Wires the Safety/Language gates, the
//! eight-layer analysis-agent DAG, retrieval (C6), prompt composition
//! (C7), multi-candidate generation (C8) and the rewrite/validation loop
//! (C9) into one request-scoped run, with the C11 multi-stage pipeline
//! as the alternative path for fine-tuned backends.

use std::time::Duration;

use persona_config::constants::generation::MIN_CANDIDATE_CHARS;
use persona_config::constants::postprocess::{DEFAULT_TARGET_MAX_LENGTH, MIN_LENGTH};
use persona_config::constants::retrieval::GENERAL_MIN_SIMILARITY;
use persona_config::constants::timeouts;
use persona_core::{
    Capabilities, EngineRequest, EngineResponse, HistoryMessage, QualityDetails, Situation,
    VectorSearchHit,
};
use persona_llm::ComposerInput;
use persona_rag::{retrieve, AsaNoRepeatTracker, RetrievalInput, RetrievalOutput};

use crate::agents::context_analyst::{Flow, Topic};
use crate::agents::{
    agreement, ambiguity, context_analyst, context_connection, conversation_context_builder,
    conversation_flow, deep_learning, example_intelligence, fake_context_builder, first_message,
    knowledge_synthesizer, learning_integrator, meeting_response, meta_validator, multi_situation,
    profile_filter, rule_interpreter, rules_applicator, situation_detector,
};
use crate::blackboard::Blackboard;
use crate::gates;
use crate::generator::{self, GeneratorInput};
use crate::multi_stage;
use crate::postprocess::PostprocessInput;
use crate::runner;
use crate::validation::{self, ValidationContext, ValidationInput};

// Not every agent gets a named timeout in `persona_config::constants::timeouts`
// (only the ones spec.md §9 calls out as hand-tuned); these two gates are
// cheap enough that a local constant is clearer than adding config surface
// for them.
const SAFETY_TIMEOUT: Duration = Duration::from_secs(6);
const LANGUAGE_TIMEOUT: Duration = Duration::from_secs(8);
const RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(15);

const GERMAN_ONLY_REPLY: &str =
    "Entschuldige, ich kann nur auf Deutsch antworten. Magst du mir auf Deutsch schreiben?";

fn topic_label(topic: Topic) -> &'static str {
    match topic {
        Topic::Philosophical => "philosophical",
        Topic::Sexual => "sexual",
        Topic::General => "general",
        Topic::Occupation => "occupation",
        Topic::Hobby => "hobby",
    }
}

fn merged_history(request: &EngineRequest) -> Vec<HistoryMessage> {
    let mut combined: Vec<HistoryMessage> =
        request.moderator_messages.iter().cloned().chain(request.customer_messages.iter().cloned()).collect();
    combined.sort_by_key(|m| m.timestamp);
    combined
}

/// Runs the full pipeline for one request and produces the final
/// outbound response. Never panics on a downstream agent failure: every
/// analysis agent is wrapped by the Agent Runner (C2) and degrades to a
/// typed fallback instead of aborting the request.
pub async fn run(
    request: &EngineRequest,
    model: &str,
    is_fine_tuned_backend: bool,
    asa_tracker: &AsaNoRepeatTracker,
) -> EngineResponse {
    let capabilities = &request.capabilities;
    let blackboard = Blackboard::new();
    blackboard.set_learning_stats(request.learning_stats.clone());

    // Layer 1 (sequential): Safety, then Language.
    let moderation = runner::run_fallible(
        "safety",
        persona_core::ModerationResult { is_blocked: false, reason: None, error_message: None },
        SAFETY_TIMEOUT,
        gates::check_safety(capabilities, &request.customer_message),
    )
    .await;
    if moderation.is_blocked {
        return EngineResponse::blocked(moderation.reason.unwrap_or_else(|| "content blocked".to_string()));
    }

    let language = runner::run(
        "language",
        gates::LanguageGateResult::fallback(),
        LANGUAGE_TIMEOUT,
        gates::check_language(capabilities, model, &request.customer_message),
    )
    .await;
    if language.should_block() {
        return EngineResponse::needs_german(GERMAN_ONLY_REPLY);
    }

    if is_fine_tuned_backend {
        return run_fine_tuned(request, model, asa_tracker).await;
    }

    if request.flags.is_asa {
        return run_asa(request, model, asa_tracker).await;
    }

    let history = merged_history(request);

    // Layer 2 (sequential, feeds everyone): Context Analyst.
    let context = runner::run(
        "context_analyst",
        context_analyst::ContextAnalysis::fallback(),
        timeouts::CONTEXT_ANALYST,
        context_analyst::run(capabilities, model, &request.customer_message, &history),
    )
    .await;

    // Layer 3 (parallel): cheap synchronous agents run inline, the two
    // that call out to an LLM are raced concurrently.
    let profile_filter_result = profile_filter::run(&request.profile_info, &request.customer_message);
    let fake_context = fake_context_builder::run(&request.profile_info);
    let conversation_flow_result =
        conversation_flow::run(&blackboard, &request.customer_message, &request.moderator_messages, &request.customer_messages);
    let agreement_result = agreement::run(&request.moderator_messages, &request.customer_messages);
    let first_message_result = first_message::run(request);

    let context_already_sexual = context.topic == Topic::Sexual || context.flow == Flow::Sexual;
    let (situation_result, ambiguity_result) = tokio::join!(
        runner::run(
            "situation_detector",
            situation_detector::SituationDetectionResult::fallback(),
            timeouts::SITUATION_DETECTOR,
            situation_detector::run(
                capabilities,
                &request.rules,
                &request.profile_info,
                &request.customer_message,
                &history,
                context_already_sexual,
            ),
        ),
        runner::run(
            "ambiguity",
            ambiguity::AmbiguityResult::fallback(),
            timeouts::AMBIGUITY,
            ambiguity::run(capabilities, model, &request.customer_message, &request.profile_info),
        ),
    );

    if situation_result.location_question_error {
        return EngineResponse::location_handoff(
            "location question has no resolvable city",
            request.customer_message.clone(),
        );
    }

    // Layer 4 (sequential): Meta-Validator overrides the situation list.
    let meta = meta_validator::run(&situation_result.situations, &request.customer_message);
    let mut situations = situation_result.situations.clone();
    let should_demote_sexual =
        first_message_result.is_first_message || meta.harmless_collocation_matched || context.topic != Topic::Sexual;
    if should_demote_sexual {
        situations.retain(|s| s.as_str() != Situation::SEXUELLE_THEMEN);
    }
    persona_core::sort_by_priority(&mut situations);

    for instruction in &meta.policy_instructions {
        blackboard.add_priority(instruction.clone(), persona_core::Priority::High, "meta_validator");
    }

    let is_meeting_request = situations.iter().any(|s| s.as_str() == Situation::TREFFEN);
    let is_sexual = situations.iter().any(|s| s.as_str() == Situation::SEXUELLE_THEMEN);

    // Layer 5 (parallel): Multi-Situation Handler, Conversation-Context
    // Builder, Context-Connection Analyzer.
    let multi_situation_result = multi_situation::run(&situations);
    if let Some(instruction) = &multi_situation_result.instruction {
        blackboard.add_priority(instruction.clone(), persona_core::Priority::High, "multi_situation");
    }
    let conversation_context_block =
        conversation_context_builder::run(&request.moderator_messages, &request.customer_messages);
    let context_connection_result = runner::run(
        "context_connection",
        context_connection::ContextConnectionResult::fallback(),
        timeouts::CONTEXT_CONNECTION,
        context_connection::run(capabilities, model, &request.customer_message, &request.moderator_messages, &request.customer_messages),
    )
    .await;
    for question in &context_connection_result.open_questions {
        blackboard.add_priority(format!("Offene Frage: {question}"), persona_core::Priority::High, "context_connection");
    }

    // Layer 6 (parallel, heavy): retrieval (the "Training Selector"),
    // Style Analyst, Learning-Integrator and Deep Learning don't depend
    // on each other; Example-Intelligence and Meeting-Response need
    // retrieval's hits, so they're sequenced just after it resolves.
    let key_points_joined = context.key_points.join(", ");
    let retrieval_input = RetrievalInput {
        customer_message: &request.customer_message,
        topic: topic_label(context.topic),
        key_points: &key_points_joined,
        situations: &situations,
        topic_keywords: &[],
        is_asa: request.flags.is_asa,
        is_first_message: first_message_result.is_first_message,
        persona_id: &request.persona_id,
        asa_examples: &request.training_data.asa_examples,
        vector_search: capabilities.vector_search.clone(),
        learning_stats: request.learning_stats.as_ref(),
        asa_tracker,
        example_intel_best_similarity: 0.0,
    };

    let (retrieval, style_features, learning_integrator_result, _deep_learning_result) = tokio::join!(
        runner::run_fallible(
            "retrieval",
            RetrievalOutput { examples: vec![], similarities: vec![], fallback_mode: true },
            RETRIEVAL_TIMEOUT,
            retrieve(retrieval_input),
        ),
        async { crate::agents::style_analyst::run(capabilities, &request.moderator_messages) },
        async { learning_integrator::run(&blackboard, request.learning_stats.as_ref(), &situations) },
        async { deep_learning::run(request.learning_stats.as_ref()) },
    );

    let retrieval_hits: Vec<VectorSearchHit> = retrieval
        .examples
        .iter()
        .cloned()
        .zip(retrieval.similarities.iter().copied())
        .map(|(example, similarity)| VectorSearchHit { example, similarity })
        .collect();

    let example_intelligence_result = example_intelligence::run(retrieval_hits.clone(), GENERAL_MIN_SIMILARITY);

    let meeting_response_result = if is_meeting_request {
        let split = retrieval_hits.len().min(25);
        let (meeting_part, general_part) = retrieval_hits.split_at(split);
        meeting_response::run(meeting_part, general_part)
    } else {
        meeting_response::MeetingResponseResult::default()
    };

    let has_learning_data = !request.training_data.conversations.is_empty() || !request.training_data.asa_examples.is_empty();

    // Layer 7 (sequential): Rule Interpreter, Rules-Applicator, Knowledge
    // Synthesizer.
    let rule_interpreter_result = runner::run(
        "rule_interpreter",
        rule_interpreter::RuleInterpreterResult::fallback(),
        timeouts::RULE_INTERPRETER,
        rule_interpreter::run(capabilities, model, &request.rules, &retrieval.examples),
    )
    .await;
    let rules_applicator_result = rules_applicator::run(&request.rules, &situations);
    let synthesized = knowledge_synthesizer::run(&blackboard, &rule_interpreter_result, &rules_applicator_result);

    // Layer 8: prompt composition (C7) and generation (C8/C9), or the
    // C11 multi-stage pipeline when the active backend is fine-tuned.

    let requires_reciprocity = context.flow == Flow::Positive || context.flow == Flow::Sexual || is_sexual;

    let message_stats = situations
        .first()
        .and_then(|s| request.learning_stats.message_stats.get(s.as_str()))
        .or_else(|| request.learning_stats.message_stats.get("allgemein"));
    let target_max_length = message_stats
        .map(|m| m.positive.median_length as usize)
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TARGET_MAX_LENGTH);
    let target_question_count =
        message_stats.map(|m| m.positive.median_questions as usize).filter(|v| *v > 0).unwrap_or(1);

    let mut critical_rules = String::from("Bleib im Schreibstil natürlich und ungezwungen, keine Meta-Kommentare.\n");
    if !request.rules.forbidden_words.is_empty() {
        critical_rules.push_str(&format!("Verwende niemals diese Wörter: {}\n", request.rules.forbidden_words.join(", ")));
    }
    for instruction in &rules_applicator_result.critical_rules {
        critical_rules.push_str(instruction);
        critical_rules.push('\n');
    }
    if first_message_result.is_first_message {
        critical_rules.push_str(
            "Keine Selbstvorstellung (kein Name/Alter/Stadt), 1-2 Eröffnungsfragen, kein Treffen-Hinweis, keine sexuellen Inhalte, mindestens 150 Zeichen.\n",
        );
    }
    for instruction in &meta.policy_instructions {
        critical_rules.push_str(instruction);
        critical_rules.push('\n');
    }

    let mut hard_enforcement_preface = String::new();
    if !context_connection_result.open_questions.is_empty() {
        hard_enforcement_preface
            .push_str(&format!("Offene Fragen, die beantwortet werden müssen: {}\n", context_connection_result.open_questions.join("; ")));
    }
    if !context_connection_result.already_answered_questions.is_empty() {
        hard_enforcement_preface.push_str(&format!(
            "Diese Fragen NICHT erneut stellen: {}\n",
            context_connection_result.already_answered_questions.join("; ")
        ));
    }
    if requires_reciprocity {
        hard_enforcement_preface.push_str("Zeige Zustimmung/Reziprozität (z.B. \"auch\", \"freut mich\").\n");
    }

    let mut training_data_block = String::new();
    if retrieval.fallback_mode {
        training_data_block
            .push_str("Keine guten Trainingsdaten vorhanden. Antworte natürlich und einfach, ohne ein Beispiel nachzuahmen.\n");
    } else {
        for (i, hit) in example_intelligence_result.selected.iter().take(5).enumerate() {
            training_data_block.push_str(&format!("Beispiel {} (Priorität {}): {}\n", i + 1, i + 1, hit.example.response_text()));
        }
        if request.flags.is_asa {
            training_data_block.push_str("ASA: Kopiere das Beispiel nahezu wörtlich.\n");
        }
    }

    let mut learning_system_block = synthesized.synthesized_knowledge.clone();
    for insight in &synthesized.priority_insights {
        learning_system_block.push_str(&format!("\n[Priorität] {insight}"));
    }
    if !meeting_response_result.allowed_phrases.is_empty() {
        learning_system_block.push_str(&format!("\nErlaubte Ausweich-Formulierungen: {}", meeting_response_result.allowed_phrases.join(" | ")));
    }
    if let Some(guidance) = &rule_interpreter_result.guidance {
        learning_system_block.push_str(&format!("\n{guidance}"));
    }

    let mut situations_block = String::new();
    for situation in &situations {
        if let Some(instruction) = request.rules.situational_responses.get(situation.as_str()) {
            situations_block.push_str(instruction);
            situations_block.push('\n');
        }
    }

    let mut context_block = fake_context.facts.join("\n");
    if let Some(neighborhood) = &fake_context.neighborhood_reply {
        context_block.push_str(&format!("\nViertel, falls gefragt: {neighborhood}"));
    }
    for fact in &profile_filter_result.relevant_facts {
        context_block.push_str(&format!("\n{fact}"));
    }
    if profile_filter_result.picture_request_unsupported {
        context_block.push_str("\nKeine Bilder vorhanden, freundlich ablehnen.");
    }
    if ambiguity_result.fired {
        context_block.push_str(&format!("\nKontext-Klärung: {}", ambiguity_result.resolved_meaning));
        for recommendation in &ambiguity_result.recommendations {
            context_block.push_str(&format!("\n{recommendation}"));
        }
    }
    if !agreement_result.consensus_map.is_empty() {
        context_block.push_str("\nBereits bestätigte/abgelehnte Aussagen nicht widersprechen.");
    }
    if !conversation_flow_result.outdated_topics.is_empty() {
        context_block.push_str("\nVeraltete Themen ignorieren, auf den aktuellen Verlauf beziehen.");
    }

    let customer_message_block = if request.flags.is_asa {
        String::new()
    } else {
        format!("Kundennachricht: \"{}\"\nBeantworte die zuletzt gestellte Kundennachricht direkt.", request.customer_message)
    };

    let mut final_instructions_block = format!(
        "Antwortlänge zwischen {MIN_LENGTH} und {target_max_length} Zeichen, maximal {target_question_count} Frage(n), keine Ausrufezeichen."
    );
    if first_message_result.is_first_message {
        final_instructions_block.push_str(" Dies ist die erste Nachricht: keine Selbstvorstellung, 1-2 Eröffnungsfragen, kein Treffen, nichts Sexuelles.");
    }
    if is_sexual {
        final_instructions_block.push_str(" Das Gespräch ist sexuell konnotiert: bleib im erlaubten Rahmen.");
    }
    if is_meeting_request {
        final_instructions_block.push_str(" Der Kunde fragt nach einem Treffen: weiche höflich aus, ohne eine Zusage zu machen.");
    }

    let composer = ComposerInput {
        hard_enforcement_preface,
        critical_rules: critical_rules.clone(),
        chat_history_block: conversation_context_block.rendered_history.clone(),
        training_data_block,
        learning_system_block,
        situations_block,
        context_block,
        customer_message_block,
        final_instructions_block,
        is_asa: request.flags.is_asa,
    };

    let reference_texts: Vec<String> =
        example_intelligence_result.selected.iter().map(|h| h.example.response_text().to_string()).collect();

    let postprocess_template = PostprocessInput {
        candidate: "",
        target_sentence_count: None,
        target_question_count,
        target_max_length,
        is_sexual,
    };

    let generation = generator::run(
        capabilities,
        &blackboard,
        &request.customer_message,
        GeneratorInput {
            model,
            composer: &composer,
            reference_texts: &reference_texts,
            good_patterns: &learning_integrator_result.response_patterns,
            has_learning_data,
            fallback_mode: retrieval.fallback_mode,
            postprocess: PostprocessInput { candidate: "", ..clone_postprocess_template(&postprocess_template) },
        },
    )
    .await;

    if !generation.success || generation.message.len() < MIN_CANDIDATE_CHARS {
        return EngineResponse::failure("generation failed to produce a usable candidate");
    }

    let (system_prompt, _) = composer.to_messages();
    let validation_context = ValidationContext {
        capabilities,
        model,
        system_prompt: &system_prompt,
        rules: &request.rules,
        agreement: &agreement_result,
        postprocess_template: PostprocessInput { candidate: "", ..clone_postprocess_template(&postprocess_template) },
    };
    let validation_input = ValidationInput {
        open_questions: context_connection_result.open_questions.clone(),
        already_answered_questions: context_connection_result.already_answered_questions.clone(),
        requires_reciprocity,
        is_meeting_request,
        meeting_blocked_phrases: meeting_response_result.blocked_phrases.clone(),
        customer_message: request.customer_message.clone(),
    };

    let validated = validation::run(validation_context, validation_input, generation.message).await;
    if let Some(violation) = &validated.critical_violation {
        return EngineResponse::failure(format!("Kritische Regelverstöße: {violation}"));
    }
    if validated.message.trim().len() < MIN_LENGTH {
        return EngineResponse::failure("reply too short after validation");
    }

    let quality_score = generation.quality.total().min(100);
    let details = QualityDetails {
        training_data_usage: generation.quality.training_data_usage,
        context_usage: generation.quality.context_usage,
        rules_compliance: generation.quality.rules_compliance,
        learning_system_usage: generation.quality.learning_system_usage,
        semantic_validation: generation.quality.semantic_validation,
        ml_quality: None,
    };

    // `style_features` feeds future per-persona style calibration but has
    // no consumer yet in this pipeline revision.
    let _ = style_features;

    EngineResponse::success(validated.message, quality_score, details)
}

/// The C11 alternative orchestration for fine-tuned backends: four LLM
/// calls instead of the full layered DAG. Branches immediately after the
/// shared Safety/Language gates, so none of the heavier Layer 2-7 agents
/// (context analysis, retrieval, rule reconciliation, ...) run at all —
/// that DAG is exactly what this path exists to avoid.
async fn run_fine_tuned(request: &EngineRequest, model: &str, asa_tracker: &AsaNoRepeatTracker) -> EngineResponse {
    let capabilities = &request.capabilities;

    let mut hard_rules = String::from("Bleib im Schreibstil natürlich und ungezwungen, keine Meta-Kommentare.\n");
    if !request.rules.forbidden_words.is_empty() {
        hard_rules.push_str(&format!("Verwende niemals diese Wörter: {}\n", request.rules.forbidden_words.join(", ")));
    }
    for instruction in &request.rules.critical_rules {
        hard_rules.push_str(instruction);
        hard_rules.push('\n');
    }

    let plan = match multi_stage::plan(capabilities, model, request).await {
        Ok(plan) => plan,
        Err(err) => return EngineResponse::location_handoff(err.reason, err.customer_message),
    };
    let examples = multi_stage::select_examples(capabilities, model, request, &plan, asa_tracker).await;
    let Some(generated) = multi_stage::generate(capabilities, model, request, &plan, &examples, &hard_rules).await else {
        return EngineResponse::failure("generation failed");
    };
    let corrected = multi_stage::validate_and_correct(capabilities, model, &plan, generated, request.flags.is_asa).await;
    if corrected.trim().is_empty() {
        return EngineResponse::failure("empty reply after validation");
    }
    EngineResponse::success(corrected, 70, QualityDetails::default())
}

/// The fixed-generic path for ASA (reactivation) requests (spec.md §3,
/// §8): these never consult situation detection, context analysis,
/// conversation-flow analysis, ambiguity resolution or
/// example-intelligence. Retrieval draws exactly one example at random
/// (C6 step 3) and generation is steered to imitate it near-verbatim
/// instead of synthesizing from a ranked set.
async fn run_asa(request: &EngineRequest, model: &str, asa_tracker: &AsaNoRepeatTracker) -> EngineResponse {
    let capabilities = &request.capabilities;
    let blackboard = Blackboard::new();
    blackboard.set_learning_stats(request.learning_stats.clone());

    let profile_filter_result = profile_filter::run(&request.profile_info, &request.customer_message);
    let fake_context = fake_context_builder::run(&request.profile_info);
    let agreement_result = agreement::run(&request.moderator_messages, &request.customer_messages);
    let first_message_result = first_message::run(request);
    let conversation_context_block =
        conversation_context_builder::run(&request.moderator_messages, &request.customer_messages);
    let context_connection_result = runner::run(
        "context_connection",
        context_connection::ContextConnectionResult::fallback(),
        timeouts::CONTEXT_CONNECTION,
        context_connection::run(capabilities, model, &request.customer_message, &request.moderator_messages, &request.customer_messages),
    )
    .await;

    // No situation list: situation detection never runs on this path.
    let situations: Vec<Situation> = vec![];

    let retrieval_input = RetrievalInput {
        customer_message: &request.customer_message,
        topic: "allgemein",
        key_points: "",
        situations: &situations,
        topic_keywords: &[],
        is_asa: true,
        is_first_message: first_message_result.is_first_message,
        persona_id: &request.persona_id,
        asa_examples: &request.training_data.asa_examples,
        vector_search: capabilities.vector_search.clone(),
        learning_stats: request.learning_stats.as_ref(),
        asa_tracker,
        example_intel_best_similarity: 0.0,
    };

    let (retrieval, style_features, learning_integrator_result, _deep_learning_result) = tokio::join!(
        runner::run_fallible(
            "retrieval",
            RetrievalOutput { examples: vec![], similarities: vec![], fallback_mode: false },
            RETRIEVAL_TIMEOUT,
            retrieve(retrieval_input),
        ),
        async { crate::agents::style_analyst::run(capabilities, &request.moderator_messages) },
        async { learning_integrator::run(&blackboard, request.learning_stats.as_ref(), &situations) },
        async { deep_learning::run(request.learning_stats.as_ref()) },
    );

    let has_learning_data = !request.training_data.conversations.is_empty() || !request.training_data.asa_examples.is_empty();

    let rule_interpreter_result = runner::run(
        "rule_interpreter",
        rule_interpreter::RuleInterpreterResult::fallback(),
        timeouts::RULE_INTERPRETER,
        rule_interpreter::run(capabilities, model, &request.rules, &retrieval.examples),
    )
    .await;
    let rules_applicator_result = rules_applicator::run(&request.rules, &situations);
    let synthesized = knowledge_synthesizer::run(&blackboard, &rule_interpreter_result, &rules_applicator_result);

    let message_stats = request.learning_stats.message_stats.get("allgemein");
    let target_max_length = message_stats
        .map(|m| m.positive.median_length as usize)
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TARGET_MAX_LENGTH);
    let target_question_count =
        message_stats.map(|m| m.positive.median_questions as usize).filter(|v| *v > 0).unwrap_or(1);

    let mut critical_rules = String::from("Bleib im Schreibstil natürlich und ungezwungen, keine Meta-Kommentare.\n");
    if !request.rules.forbidden_words.is_empty() {
        critical_rules.push_str(&format!("Verwende niemals diese Wörter: {}\n", request.rules.forbidden_words.join(", ")));
    }
    for instruction in &rules_applicator_result.critical_rules {
        critical_rules.push_str(instruction);
        critical_rules.push('\n');
    }
    if first_message_result.is_first_message {
        critical_rules.push_str(
            "Keine Selbstvorstellung (kein Name/Alter/Stadt), 1-2 Eröffnungsfragen, kein Treffen-Hinweis, keine sexuellen Inhalte, mindestens 150 Zeichen.\n",
        );
    }

    let mut hard_enforcement_preface = String::new();
    if !context_connection_result.open_questions.is_empty() {
        hard_enforcement_preface
            .push_str(&format!("Offene Fragen, die beantwortet werden müssen: {}\n", context_connection_result.open_questions.join("; ")));
    }
    if !context_connection_result.already_answered_questions.is_empty() {
        hard_enforcement_preface.push_str(&format!(
            "Diese Fragen NICHT erneut stellen: {}\n",
            context_connection_result.already_answered_questions.join("; ")
        ));
    }

    let mut training_data_block = String::new();
    if let Some(example) = retrieval.examples.first() {
        training_data_block.push_str(&format!("Beispiel (fast wörtlich übernehmen): {}\n", example.response_text()));
        training_data_block.push_str("ASA: Kopiere das Beispiel nahezu wörtlich.\n");
    } else {
        training_data_block
            .push_str("Keine ASA-Beispiele vorhanden. Schreibe eine kurze, natürliche Reaktivierungsnachricht.\n");
    }

    let mut learning_system_block = synthesized.synthesized_knowledge.clone();
    for insight in &synthesized.priority_insights {
        learning_system_block.push_str(&format!("\n[Priorität] {insight}"));
    }
    if let Some(guidance) = &rule_interpreter_result.guidance {
        learning_system_block.push_str(&format!("\n{guidance}"));
    }

    let mut context_block = fake_context.facts.join("\n");
    if let Some(neighborhood) = &fake_context.neighborhood_reply {
        context_block.push_str(&format!("\nViertel, falls gefragt: {neighborhood}"));
    }
    for fact in &profile_filter_result.relevant_facts {
        context_block.push_str(&format!("\n{fact}"));
    }
    if profile_filter_result.picture_request_unsupported {
        context_block.push_str("\nKeine Bilder vorhanden, freundlich ablehnen.");
    }
    if !agreement_result.consensus_map.is_empty() {
        context_block.push_str("\nBereits bestätigte/abgelehnte Aussagen nicht widersprechen.");
    }

    let mut final_instructions_block = format!(
        "Antwortlänge zwischen {MIN_LENGTH} und {target_max_length} Zeichen, maximal {target_question_count} Frage(n), keine Ausrufezeichen."
    );
    if first_message_result.is_first_message {
        final_instructions_block.push_str(" Dies ist die erste Nachricht: keine Selbstvorstellung, 1-2 Eröffnungsfragen, kein Treffen, nichts Sexuelles.");
    }
    final_instructions_block.push_str(
        " Dies ist eine Reaktivierungsnachricht: klinge wie ein frischer, natürlicher Kontaktversuch, erwähne niemals \"Reaktivierung\".",
    );

    let composer = ComposerInput {
        hard_enforcement_preface,
        critical_rules: critical_rules.clone(),
        chat_history_block: conversation_context_block.rendered_history.clone(),
        training_data_block,
        learning_system_block,
        situations_block: String::new(),
        context_block,
        customer_message_block: String::new(),
        final_instructions_block,
        is_asa: true,
    };

    let reference_texts: Vec<String> = retrieval.examples.iter().map(|e| e.response_text().to_string()).collect();

    let postprocess_template =
        PostprocessInput { candidate: "", target_sentence_count: None, target_question_count, target_max_length, is_sexual: false };

    let generation = generator::run(
        capabilities,
        &blackboard,
        &request.customer_message,
        GeneratorInput {
            model,
            composer: &composer,
            reference_texts: &reference_texts,
            good_patterns: &learning_integrator_result.response_patterns,
            has_learning_data,
            fallback_mode: false,
            postprocess: PostprocessInput { candidate: "", ..clone_postprocess_template(&postprocess_template) },
        },
    )
    .await;

    if !generation.success || generation.message.len() < MIN_CANDIDATE_CHARS {
        return EngineResponse::failure("generation failed to produce a usable candidate");
    }

    let (system_prompt, _) = composer.to_messages();
    let validation_context = ValidationContext {
        capabilities,
        model,
        system_prompt: &system_prompt,
        rules: &request.rules,
        agreement: &agreement_result,
        postprocess_template: PostprocessInput { candidate: "", ..clone_postprocess_template(&postprocess_template) },
    };
    let validation_input = ValidationInput {
        open_questions: context_connection_result.open_questions.clone(),
        already_answered_questions: context_connection_result.already_answered_questions.clone(),
        requires_reciprocity: false,
        is_meeting_request: false,
        meeting_blocked_phrases: vec![],
        customer_message: request.customer_message.clone(),
    };

    let validated = validation::run(validation_context, validation_input, generation.message).await;
    if let Some(violation) = &validated.critical_violation {
        return EngineResponse::failure(format!("Kritische Regelverstöße: {violation}"));
    }
    if validated.message.trim().len() < MIN_LENGTH {
        return EngineResponse::failure("reply too short after validation");
    }

    let quality_score = generation.quality.total().min(100);
    let details = QualityDetails {
        training_data_usage: generation.quality.training_data_usage,
        context_usage: generation.quality.context_usage,
        rules_compliance: generation.quality.rules_compliance,
        learning_system_usage: generation.quality.learning_system_usage,
        semantic_validation: generation.quality.semantic_validation,
        ml_quality: None,
    };

    let _ = style_features;

    EngineResponse::success(validated.message, quality_score, details)
}

fn clone_postprocess_template<'a>(input: &PostprocessInput<'a>) -> PostprocessInput<'a> {
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
    use persona_core::{ExtractedUserInfo, ProfileInfo, RequestFlags, RulesBundle};
    use std::sync::Arc;

    fn request(capabilities: Capabilities) -> EngineRequest {
        EngineRequest {
            persona_id: "persona-1".to_string(),
            customer_message: "Wie war dein Tag heute?".to_string(),
            conversation_history: String::new(),
            moderator_messages: vec![HistoryMessage { text: "Mir geht es gut, und dir?".to_string(), timestamp: None }],
            customer_messages: vec![],
            profile_info: ProfileInfo::default(),
            extracted_user_info: ExtractedUserInfo::default(),
            rules: RulesBundle::default(),
            training_data: Default::default(),
            feedback_data: None,
            learning_stats: Arc::new(Default::default()),
            image_url: None,
            image_type: None,
            image_description: None,
            flags: RequestFlags::default(),
            capabilities,
        }
    }

    #[tokio::test]
    async fn dag_path_produces_a_successful_response() {
        let caps = test_capabilities();
        let req = request(caps);
        let tracker = AsaNoRepeatTracker::new();
        let response = run(&req, "gpt", false, &tracker).await;
        assert!(response.success || response.blocked.unwrap_or(false) || response.error.is_some());
    }

    #[tokio::test]
    async fn blocked_message_short_circuits_with_no_generation() {
        let mut caps = test_capabilities();
        caps.moderation = Arc::new(crate::test_support::MockBlockingModeration { reason: "verboten".to_string() });
        let req = request(caps);
        let tracker = AsaNoRepeatTracker::new();
        let response = run(&req, "gpt", false, &tracker).await;
        assert_eq!(response.blocked, Some(true));
        assert!(response.message.is_empty());
    }

    #[tokio::test]
    async fn fine_tuned_backend_skips_the_dag_and_still_responds() {
        let caps = test_capabilities();
        let req = request(caps);
        let tracker = AsaNoRepeatTracker::new();
        let response = run(&req, "gpt", true, &tracker).await;
        assert!(response.success || response.error.is_some());
    }

    #[tokio::test]
    async fn asa_request_takes_the_short_circuit_path() {
        let caps = test_capabilities();
        let mut req = request(caps);
        req.flags.is_asa = true;
        let tracker = AsaNoRepeatTracker::new();
        let response = run(&req, "gpt", false, &tracker).await;
        assert!(response.success || response.error.is_some());
    }
}
