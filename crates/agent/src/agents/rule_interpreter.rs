//! Rule Interpreter (C5, layer 7). Reconciles training examples with the
//! rules bundle: if a preferred/example word also appears in the
//! forbidden-word list, examples win (spec.md §4.5). Falls back to the
//! same "examples win" priority silently on LLM timeout, since that is
//! already the conservative default.

use persona_core::{Capabilities, Example, RulesBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Examples,
    Rules,
}

#[derive(Debug, Clone)]
pub struct RuleInterpreterResult {
    pub priority: Priority,
    pub guidance: Option<String>,
    pub success: bool,
}

impl RuleInterpreterResult {
    pub fn fallback() -> Self {
        Self { priority: Priority::Examples, guidance: None, success: false }
    }
}

fn conflicting_words(rules: &RulesBundle, examples: &[Example]) -> Vec<String> {
    let forbidden: std::collections::HashSet<String> = rules.forbidden_words.iter().map(|w| w.to_lowercase()).collect();
    let mut conflicts = vec![];
    for word in &rules.preferred_words {
        if forbidden.contains(&word.to_lowercase()) {
            conflicts.push(word.clone());
        }
    }
    for example in examples {
        let text = example.response_text().to_lowercase();
        for word in &forbidden {
            if text.contains(word.as_str()) && !conflicts.iter().any(|c| c.eq_ignore_ascii_case(word)) {
                conflicts.push(word.clone());
            }
        }
    }
    conflicts
}

pub async fn run(
    capabilities: &Capabilities,
    model: &str,
    rules: &RulesBundle,
    examples: &[Example],
) -> RuleInterpreterResult {
    let conflicts = conflicting_words(rules, examples);
    if conflicts.is_empty() {
        return RuleInterpreterResult { priority: Priority::Examples, guidance: None, success: true };
    }

    let system = "Beispiele und Regeln widersprechen sich bei bestimmten Wörtern. Antworte als JSON mit \
        guidance (kurzer String, max. 1 Satz, der erklärt wie die Konflikte aufgelöst werden).";
    let user = format!("Widersprüchliche Wörter: {}", conflicts.join(", "));

    match capabilities.llm.complete_json(model, system, &user, 0.0, 100).await {
        Ok(raw) => {
            let guidance = raw.get("guidance").and_then(|v| v.as_str()).map(str::to_string);
            RuleInterpreterResult { priority: Priority::Examples, guidance, success: true }
        }
        Err(_) => RuleInterpreterResult::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    fn example(response: &str) -> Example {
        Example {
            id: None,
            customer_message: String::new(),
            moderator_response: Some(response.to_string()),
            asa_message: None,
            situation: None,
            explanation: None,
            is_negative_example: false,
        }
    }

    #[tokio::test]
    async fn no_conflict_short_circuits_without_llm_call() {
        let caps = test_capabilities();
        let rules = RulesBundle { forbidden_words: vec!["nummer".to_string()], ..Default::default() };
        let examples = vec![example("Lass uns erstmal weiter schreiben")];
        let result = run(&caps, "gpt", &rules, &examples).await;
        assert_eq!(result.priority, Priority::Examples);
        assert!(result.guidance.is_none());
    }

    #[tokio::test]
    async fn conflicting_example_word_resolves_to_examples_priority() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "guidance": "Beispiele dürfen das Wort im Kontext weiter verwenden."
        })));
        let rules = RulesBundle { forbidden_words: vec!["schatz".to_string()], ..Default::default() };
        let examples = vec![example("Na du Schatz, wie geht's dir?")];
        let result = run(&caps, "gpt", &rules, &examples).await;
        assert_eq!(result.priority, Priority::Examples);
        assert!(result.guidance.is_some());
    }
}
