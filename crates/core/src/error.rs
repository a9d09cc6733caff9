use thiserror::Error;

/// Crate-wide error type. Capability adapters and persistence loaders
/// surface failures through this type; the agent orchestration layer
/// converts them into typed per-agent fallbacks rather than propagating
/// them to the caller (see `persona_agent::runner`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("capability call failed: {0}")]
    Capability(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("rag error: {0}")]
    Rag(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request blocked: {0}")]
    Blocked(String),
}

pub type Result<T> = std::result::Result<T, Error>;
