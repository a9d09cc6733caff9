//! Ambiguity Resolver (C5, layer 3). Only fires when the current message
//! contains a phrase from a fixed ambiguous-phrase list or references
//! the profile; otherwise it's a cheap no-op.

use persona_config::templates::AMBIGUOUS_PHRASE_TRIGGERS;
use persona_core::{Capabilities, ProfileInfo};

#[derive(Debug, Clone, Default)]
pub struct AmbiguityResult {
    pub fired: bool,
    pub resolved_meaning: String,
    pub profile_connections: Vec<String>,
    pub sexual_context: bool,
    pub recommendations: Vec<String>,
    pub success: bool,
}

impl AmbiguityResult {
    pub fn fallback() -> Self {
        Self { success: false, ..Default::default() }
    }
}

fn references_profile(message: &str, profile: &ProfileInfo) -> bool {
    [&profile.name, &profile.city, &profile.occupation]
        .into_iter()
        .flatten()
        .any(|field| !field.is_empty() && message.to_lowercase().contains(&field.to_lowercase()))
}

pub async fn run(capabilities: &Capabilities, model: &str, customer_message: &str, profile: &ProfileInfo) -> AmbiguityResult {
    let lower = customer_message.to_lowercase();
    let triggered = AMBIGUOUS_PHRASE_TRIGGERS.iter().any(|p| lower.contains(p));
    let profile_ref = references_profile(customer_message, profile);

    if !triggered && !profile_ref {
        return AmbiguityResult { fired: false, success: true, ..Default::default() };
    }

    let system = "Du löst zweideutige Aussagen in einem Dating-Chat auf. Antworte als JSON mit resolved_meaning (String), sexual_context (bool) und recommendations (Liste von Strings).";
    let user = format!("Nachricht: \"{customer_message}\"");

    match capabilities.llm.complete_json(model, system, &user, 0.0, 200).await {
        Ok(raw) => AmbiguityResult {
            fired: true,
            resolved_meaning: raw.get("resolved_meaning").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            profile_connections: if profile_ref { vec!["profile_reference".to_string()] } else { vec![] },
            sexual_context: raw.get("sexual_context").and_then(|v| v.as_bool()).unwrap_or(false),
            recommendations: raw
                .get("recommendations")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            success: true,
        },
        Err(_) => AmbiguityResult::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[tokio::test]
    async fn does_not_fire_on_plain_messages() {
        let caps = test_capabilities();
        let profile = ProfileInfo::default();
        let result = run(&caps, "gpt", "Wie war dein Tag?", &profile).await;
        assert!(!result.fired);
    }

    #[tokio::test]
    async fn fires_on_ambiguous_phrase() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "resolved_meaning": "Anspielung", "sexual_context": false, "recommendations": []
        })));
        let profile = ProfileInfo::default();
        let result = run(&caps, "gpt", "Na du weißt schon was ich meine", &profile).await;
        assert!(result.fired);
        assert!(result.success);
    }
}
