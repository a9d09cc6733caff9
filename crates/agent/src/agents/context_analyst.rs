//! Context Analyst (C5, layer 2). Feeds every layer-3+ agent: classifies
//! topic and flow, extracts up to two key points, detects roleplay.

use persona_config::templates::EXPLICIT_SEXUAL_KEYWORDS;
use persona_core::{Capabilities, HistoryMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Philosophical,
    Sexual,
    General,
    Occupation,
    Hobby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Neutral,
    Positive,
    Negative,
    Philosophical,
    Sexual,
}

#[derive(Debug, Clone)]
pub struct RoleplayDetection {
    pub customer_role: String,
    pub expected_fake_role: String,
}

#[derive(Debug, Clone)]
pub struct ContextAnalysis {
    pub topic: Topic,
    pub flow: Flow,
    pub key_points: Vec<String>,
    pub roleplay: Option<RoleplayDetection>,
    pub success: bool,
}

impl ContextAnalysis {
    pub fn fallback() -> Self {
        Self { topic: Topic::General, flow: Flow::Neutral, key_points: vec![], roleplay: None, success: false }
    }
}

fn has_explicit_sexual_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXPLICIT_SEXUAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn parse_topic(raw: &str) -> Topic {
    match raw.to_lowercase().as_str() {
        "philosophical" => Topic::Philosophical,
        "sexual" => Topic::Sexual,
        "occupation" => Topic::Occupation,
        "hobby" => Topic::Hobby,
        _ => Topic::General,
    }
}

fn parse_flow(raw: &str) -> Flow {
    match raw.to_lowercase().as_str() {
        "positive" => Flow::Positive,
        "negative" => Flow::Negative,
        "philosophical" => Flow::Philosophical,
        "sexual" => Flow::Sexual,
        _ => Flow::Neutral,
    }
}

pub async fn run(
    capabilities: &Capabilities,
    model: &str,
    customer_message: &str,
    recent_history: &[HistoryMessage],
) -> ContextAnalysis {
    let history_text = recent_history
        .iter()
        .rev()
        .take(6)
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let system = "Du analysierst eine Chat-Nachricht einer Dating-Plattform. Antworte ausschließlich als JSON-Objekt mit den Feldern topic (philosophical|sexual|general|occupation|hobby), flow (neutral|positive|negative|philosophical|sexual), key_points (Liste von maximal 2 kurzen Strings), customer_role (String oder leer) und expected_fake_role (String oder leer).";
    let user = format!("Verlauf:\n{history_text}\n\nAktuelle Nachricht: \"{customer_message}\"");

    let raw = match capabilities.llm.complete_json(model, system, &user, 0.0, 300).await {
        Ok(value) => value,
        Err(_) => return ContextAnalysis::fallback(),
    };

    let mut topic = raw.get("topic").and_then(|v| v.as_str()).map(parse_topic).unwrap_or(Topic::General);
    let mut flow = raw.get("flow").and_then(|v| v.as_str()).map(parse_flow).unwrap_or(Flow::Neutral);

    let combined = format!("{customer_message} {history_text}");
    if (topic == Topic::Sexual || flow == Flow::Sexual) && !has_explicit_sexual_keyword(&combined) {
        if topic == Topic::Sexual {
            topic = Topic::General;
        }
        if flow == Flow::Sexual {
            flow = Flow::Neutral;
        }
    }

    let key_points = raw
        .get("key_points")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).take(2).collect())
        .unwrap_or_default();

    let customer_role = raw.get("customer_role").and_then(|v| v.as_str()).unwrap_or_default();
    let expected_fake_role = raw.get("expected_fake_role").and_then(|v| v.as_str()).unwrap_or_default();
    let roleplay = if customer_role.is_empty() && expected_fake_role.is_empty() {
        None
    } else {
        Some(RoleplayDetection { customer_role: customer_role.to_string(), expected_fake_role: expected_fake_role.to_string() })
    };

    ContextAnalysis { topic, flow, key_points, roleplay, success: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[tokio::test]
    async fn demotes_sexual_label_without_explicit_keyword() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "topic": "sexual", "flow": "sexual", "key_points": ["Alltag"]
        })));
        let analysis = run(&caps, "gpt", "Ich finde dich wirklich attraktiv", &[]).await;
        assert_eq!(analysis.topic, Topic::General);
        assert_eq!(analysis.flow, Flow::Neutral);
    }

    #[tokio::test]
    async fn keeps_sexual_label_with_explicit_keyword() {
        let mut caps = test_capabilities();
        caps.llm = std::sync::Arc::new(crate::test_support::MockLlm::with_json(serde_json::json!({
            "topic": "sexual", "flow": "sexual", "key_points": []
        })));
        let analysis = run(&caps, "gpt", "Was magst du beim Sex?", &[]).await;
        assert_eq!(analysis.topic, Topic::Sexual);
        assert_eq!(analysis.flow, Flow::Sexual);
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_general_neutral() {
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
        let analysis = run(&caps, "gpt", "Hallo", &[]).await;
        assert!(!analysis.success);
        assert_eq!(analysis.topic, Topic::General);
        assert_eq!(analysis.flow, Flow::Neutral);
    }
}
