//! OpenAI-compatible chat completion backend, with a thin subclass for
//! Together AI (same wire shape, different endpoint/auth) and a
//! fine-tuned on-premise/remote backend used by the multi-stage pipeline
//! (C11).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use persona_core::{Error, LlmCompletion, Result};

use crate::LlmError;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Generic OpenAI-compatible chat backend. Used directly for the OpenAI
/// case; Together AI and on-premise fine-tuned deployments reuse this
/// with a different `BackendConfig::endpoint`.
pub struct OpenAiCompatibleBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client builds");
        Self { client, config }
    }

    async fn call(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
            max_tokens,
            response_format: json_mode
                .then(|| serde_json::json!({ "type": "json_object" })),
        };

        let mut attempt = 0;
        let mut backoff = self.config.initial_backoff;
        loop {
            let mut req = self
                .client
                .post(format!("{}/chat/completions", self.config.endpoint))
                .json(&request);
            if let Some(key) = &self.config.api_key {
                req = req.bearer_auth(key);
            }

            match req.send().await {
                Ok(resp) if resp.status().is_success() => {
                    let parsed: ChatResponse = resp
                        .json()
                        .await
                        .map_err(|e| Error::Llm(format!("invalid completion body: {e}")))?;
                    let text = parsed
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or_else(|| Error::Llm("empty choices".to_string()))?;
                    return Ok(text);
                }
                Ok(resp) if attempt < self.config.max_retries => {
                    tracing::warn!(status = %resp.status(), attempt, "llm call failed, retrying");
                }
                Ok(resp) => {
                    return Err(Error::Llm(format!("llm call failed: {}", resp.status())));
                }
                Err(e) if attempt < self.config.max_retries => {
                    tracing::warn!(error = %e, attempt, "llm transport error, retrying");
                }
                Err(e) => return Err(Error::Llm(e.to_string())),
            }

            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
        }
    }
}

#[async_trait]
impl LlmCompletion for OpenAiCompatibleBackend {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        self.call(model, system, user, temperature, max_tokens, false).await
    }

    async fn complete_json(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Value> {
        let raw = self.call(model, system, user, temperature, max_tokens, true).await?;
        parse_tolerant_json(&raw).map_err(|e| Error::Llm(e.to_string()))
    }
}

/// Parses a JSON-mode completion that may still carry a fenced
/// ` ```json ` prefix/suffix (spec.md §6, "Wire-level notes").
pub fn parse_tolerant_json(raw: &str) -> std::result::Result<Value, LlmError> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let stripped = stripped.strip_suffix("```").unwrap_or(stripped).trim();
    serde_json::from_str(stripped).map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json_prefix() {
        let raw = "```json\n{\"a\": 1}\n```";
        let value = parse_tolerant_json(raw).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn parses_bare_json() {
        let raw = "{\"a\": 1}";
        let value = parse_tolerant_json(raw).unwrap();
        assert_eq!(value["a"], 1);
    }
}
