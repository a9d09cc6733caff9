use std::sync::Arc;
use std::time::Duration;

use persona_config::{LlmBackendChoice, LlmSettings};
use persona_core::LlmCompletion;

use crate::backend::{BackendConfig, OpenAiCompatibleBackend};

/// Picks the `LlmCompletion` backend per `USE_TOGETHER_AI` /
/// `USE_LOCAL_LLM` (spec.md §6). ASA-family generations must always be
/// routed to the general LLM, never to the fine-tuned backend — callers
/// select `general()` explicitly for that path rather than relying on
/// whatever `primary()` resolves to.
pub struct LlmFactory {
    settings: LlmSettings,
    general_endpoint: String,
}

impl LlmFactory {
    pub fn new(settings: LlmSettings) -> Self {
        let general_endpoint = "https://api.openai.com/v1".to_string();
        Self { settings, general_endpoint }
    }

    /// The backend selected by the current settings. May be the
    /// fine-tuned backend; never use this for ASA generations.
    pub fn primary(&self) -> Arc<dyn LlmCompletion> {
        match self.settings.backend_choice() {
            LlmBackendChoice::OpenAi => self.general(),
            LlmBackendChoice::TogetherAi => Arc::new(OpenAiCompatibleBackend::new(BackendConfig {
                endpoint: "https://api.together.xyz/v1".to_string(),
                api_key: self.settings.api_key.clone(),
                timeout: Duration::from_secs(30),
                max_retries: 3,
                initial_backoff: Duration::from_millis(200),
            })),
            LlmBackendChoice::LocalFineTuned => Arc::new(OpenAiCompatibleBackend::new(BackendConfig {
                endpoint: self.settings.endpoint.clone(),
                api_key: self.settings.api_key.clone(),
                timeout: Duration::from_secs(120),
                max_retries: 1,
                initial_backoff: Duration::from_millis(500),
            })),
        }
    }

    /// The general-purpose (never fine-tuned) LLM backend.
    pub fn general(&self) -> Arc<dyn LlmCompletion> {
        Arc::new(OpenAiCompatibleBackend::new(BackendConfig {
            endpoint: self.general_endpoint.clone(),
            api_key: self.settings.api_key.clone(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        }))
    }

    pub fn is_fine_tuned_backend(&self) -> bool {
        self.settings.backend_choice() == LlmBackendChoice::LocalFineTuned
    }

    pub fn model_name(&self) -> &str {
        &self.settings.ai_model
    }
}
