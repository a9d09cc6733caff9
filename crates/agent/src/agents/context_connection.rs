//! Context-Connection Analyzer (C5, layer 5). LLM call detecting open
//! announcements, open/already-answered questions, closed topics, new
//! information, and problematic requests requiring redirection
//! (spec.md §4.5).

use persona_core::{Capabilities, HistoryMessage};

#[derive(Debug, Clone, Default)]
pub struct ContextConnectionResult {
    pub open_announcements: Vec<String>,
    pub open_questions: Vec<String>,
    pub already_answered_questions: Vec<String>,
    pub closed_topics: Vec<String>,
    pub new_information: Vec<String>,
    /// Problematic requests (WhatsApp/meeting/time) paired with a
    /// deflection question drawn from training by the caller.
    pub problematic_requests: Vec<String>,
    pub success: bool,
}

impl ContextConnectionResult {
    pub fn fallback() -> Self {
        Self { success: false, ..Default::default() }
    }
}

fn string_list(raw: &serde_json::Value, field: &str) -> Vec<String> {
    raw.get(field)
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

pub async fn run(
    capabilities: &Capabilities,
    model: &str,
    customer_message: &str,
    moderator_messages: &[HistoryMessage],
    customer_messages: &[HistoryMessage],
) -> ContextConnectionResult {
    let history_text = moderator_messages
        .iter()
        .rev()
        .take(8)
        .map(|m| format!("Moderator: {}", m.text))
        .chain(customer_messages.iter().rev().take(8).map(|m| format!("Kunde: {}", m.text)))
        .collect::<Vec<_>>()
        .join("\n");

    let system = "Du analysierst einen Dating-Chat-Verlauf. Antworte als JSON-Objekt mit den Feldern \
        open_announcements (Liste: angekündigte, aber noch nicht erfüllte Ankündigungen wie 'das erzähl ich dir später'), \
        open_questions (Liste: noch unbeantwortete Fragen), \
        already_answered_questions (Liste: bereits beantwortete Fragen, die NICHT erneut gestellt werden dürfen), \
        closed_topics (Liste: Themen, die der Kunde mit 'schade' o.ä. abgeschlossen hat), \
        new_information (Liste: neue Fakten wie Arbeit, Uhrzeit, Abreise/Rückkehr), \
        problematic_requests (Liste: WhatsApp-, Treffen- oder Uhrzeit-Anfragen, die eine Umleitung brauchen).";
    let user = format!("Verlauf:\n{history_text}\n\nAktuelle Nachricht: \"{customer_message}\"");

    match capabilities.llm.complete_json(model, system, &user, 0.0, 500).await {
        Ok(raw) => ContextConnectionResult {
            open_announcements: string_list(&raw, "open_announcements"),
            open_questions: string_list(&raw, "open_questions"),
            already_answered_questions: string_list(&raw, "already_answered_questions"),
            closed_topics: string_list(&raw, "closed_topics"),
            new_information: string_list(&raw, "new_information"),
            problematic_requests: string_list(&raw, "problematic_requests"),
            success: true,
        },
        Err(_) => ContextConnectionResult::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[tokio::test]
    async fn parses_all_fields_from_llm_response() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "open_announcements": ["erzähl dir später von meiner Reise"],
            "open_questions": ["Was machst du am Wochenende?"],
            "already_answered_questions": ["Wie alt bist du?"],
            "closed_topics": ["Treffen - schade"],
            "new_information": ["arbeitet als Friseurin"],
            "problematic_requests": ["WhatsApp Nummer"]
        })));
        let result = run(&caps, "gpt", "Hi", &[], &[]).await;
        assert_eq!(result.open_questions, vec!["Was machst du am Wochenende?".to_string()]);
        assert_eq!(result.problematic_requests, vec!["WhatsApp Nummer".to_string()]);
        assert!(result.success);
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_empty() {
        struct FailingLlm;
        #[async_trait::async_trait]
        impl persona_core::LlmCompletion for FailingLlm {
            async fn complete(&self, _: &str, _: &str, _: &str, _: f32, _: u32) -> persona_core::Result<String> {
                Err(persona_core::Error::Llm("down".into()))
            }
            async fn complete_json(&self, _: &str, _: &str, _: &str, _: f32, _: u32) -> persona_core::Result<serde_json::Value> {
                Err(persona_core::Error::Llm("down".into()))
            }
        }
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(FailingLlm);
        let result = run(&caps, "gpt", "Hi", &[], &[]).await;
        assert!(!result.success);
        assert!(result.open_questions.is_empty());
    }
}
