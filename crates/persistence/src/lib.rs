//! Read-only persistence for rules, training data, the feedback log,
//! derived learning statistics and optional deep patterns (spec.md §6,
//! "Persisted state layout"). All of this is read-mostly within a
//! request's lifetime: `PersistenceStore` loads each file once and caches
//! it behind a `parking_lot::RwLock`, refreshed out-of-band by calling
//! `reload_*` (e.g. from a periodic task in `persona-server`), never by
//! the request path itself (spec.md §3 "Lifecycles").

pub mod deep_patterns;
pub mod feedback;
pub mod learning_stats;
pub mod rules;
pub mod store;
pub mod training;

use thiserror::Error;

pub use deep_patterns::load_deep_patterns;
pub use feedback::load_feedback;
pub use learning_stats::load_learning_stats;
pub use rules::load_rules;
pub use store::PersistenceStore;
pub use training::load_training_data;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

impl From<PersistenceError> for persona_core::Error {
    fn from(err: PersistenceError) -> Self {
        persona_core::Error::Persistence(err.to_string())
    }
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned + Default>(
    path: &str,
    required: bool,
) -> Result<T, PersistenceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str(&raw).map_err(|source| PersistenceError::Parse {
            path: path.to_string(),
            source,
        }),
        Err(source) if !required && source.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path, "persisted file missing, using empty default");
            Ok(T::default())
        }
        Err(source) => Err(PersistenceError::Io { path: path.to_string(), source }),
    }
}
