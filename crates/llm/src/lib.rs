//! LLM backend selection, the OpenAI-compatible completion client, and
//! the three prompt-composition shapes.

pub mod backend;
pub mod factory;
pub mod prompt;

use thiserror::Error;

pub use backend::{parse_tolerant_json, BackendConfig, OpenAiCompatibleBackend};
pub use factory::LlmFactory;
pub use prompt::composer::compose;
pub use prompt::finetuned::{compose_finetuned, FinetunedComposerInput};
pub use prompt::simplified::{compose_simplified, SimplifiedComposerInput};
pub use prompt::{ComposerInput, Message, Role};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("request timed out")]
    Timeout,
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("llm configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for persona_core::Error {
    fn from(err: LlmError) -> Self {
        persona_core::Error::Llm(err.to_string())
    }
}
