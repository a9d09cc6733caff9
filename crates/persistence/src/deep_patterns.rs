use chrono::{DateTime, Duration, Utc};

use persona_core::DeepPatterns;

use crate::PersistenceError;

/// Deep patterns older than this are treated as absent by the Deep
/// Learning agent, which schedules a background re-extraction rather
/// than blocking the request on it (spec.md §4.5 Deep Learning).
pub fn staleness_threshold() -> Duration {
    Duration::days(7)
}

/// Loads `deep-patterns.json`. Absent is a normal, expected state — the
/// file is written by a background extraction job, never by the request
/// path (spec.md §3 "Lifecycles").
pub async fn load_deep_patterns(path: &str) -> Result<Option<DeepPatterns>, PersistenceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => {
            let patterns: DeepPatterns = serde_json::from_str(&raw)
                .map_err(|source| PersistenceError::Parse { path: path.to_string(), source })?;
            Ok(Some(patterns))
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistenceError::Io { path: path.to_string(), source }),
    }
}

/// Overwrites `deep-patterns.json` with a freshly extracted result. The
/// sole background writer in the system (spec.md §5, "Deep-pattern
/// extraction is the only background write and is fire-and-forget").
pub async fn save_deep_patterns(path: &str, patterns: &DeepPatterns) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string_pretty(patterns)
        .map_err(|source| PersistenceError::Parse { path: path.to_string(), source })?;
    tokio::fs::write(path, raw)
        .await
        .map_err(|source| PersistenceError::Io { path: path.to_string(), source })
}

/// True when `patterns` is missing its `last_updated` stamp, or that
/// stamp is older than `STALENESS_THRESHOLD` relative to `now`.
pub fn is_stale(patterns: Option<&DeepPatterns>, now: DateTime<Utc>) -> bool {
    match patterns.and_then(|p| p.last_updated) {
        Some(updated) => now.signed_duration_since(updated) > staleness_threshold(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_timestamp_is_stale() {
        let patterns = DeepPatterns::default();
        assert!(is_stale(Some(&patterns), Utc::now()));
    }

    #[test]
    fn recent_timestamp_is_not_stale() {
        let patterns = DeepPatterns { patterns: serde_json::json!({}), last_updated: Some(Utc::now()) };
        assert!(!is_stale(Some(&patterns), Utc::now()));
    }

    #[test]
    fn absent_patterns_are_stale() {
        assert!(is_stale(None, Utc::now()));
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let patterns = DeepPatterns { patterns: serde_json::json!({"x": 1}), last_updated: Some(Utc::now()) };
        save_deep_patterns(path, &patterns).await.unwrap();
        let loaded = load_deep_patterns(path).await.unwrap().unwrap();
        assert_eq!(loaded.patterns, serde_json::json!({"x": 1}));
    }
}
