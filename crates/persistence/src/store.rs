use parking_lot::RwLock;
use std::sync::Arc;

use persona_core::{DeepPatterns, FeedbackData, LearningStatistics, Result, RulesBundle, TrainingData};

use crate::{load_deep_patterns, load_feedback, load_learning_stats, load_rules, load_training_data};

#[derive(Debug, Clone)]
pub struct StorePaths {
    pub rules: String,
    pub training_data: String,
    pub feedback: String,
    pub learning_stats: String,
    pub deep_patterns: String,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            rules: "./data/rules.json".to_string(),
            training_data: "./data/training-data.json".to_string(),
            feedback: "./data/feedback.json".to_string(),
            learning_stats: "./data/learning-stats.json".to_string(),
            deep_patterns: "./data/deep-patterns.json".to_string(),
        }
    }
}

struct Cached {
    rules: Arc<RulesBundle>,
    training_data: Arc<TrainingData>,
    feedback: Arc<FeedbackData>,
    learning_stats: Arc<LearningStatistics>,
    deep_patterns: Option<Arc<DeepPatterns>>,
}

/// Process-wide read-mostly cache over the five persisted files (spec.md
/// §6 "Persisted state layout"). Every request reads the currently cached
/// snapshot exactly once (spec.md §3 "Lifecycles: read-mostly; refreshed
/// out-of-band; one read per request"); refreshing happens by calling
/// `reload` from an out-of-band task, never from the request path.
pub struct PersistenceStore {
    paths: StorePaths,
    strict: bool,
    cached: RwLock<Cached>,
}

impl PersistenceStore {
    pub async fn load(paths: StorePaths, strict: bool) -> Result<Self> {
        let cached = Self::load_all(&paths, strict).await?;
        Ok(Self { paths, strict, cached: RwLock::new(cached) })
    }

    async fn load_all(paths: &StorePaths, strict: bool) -> Result<Cached> {
        let rules = load_rules(&paths.rules, strict).await?;
        let training_data = load_training_data(&paths.training_data, strict).await?;
        let feedback = load_feedback(&paths.feedback).await?;
        let learning_stats = load_learning_stats(&paths.learning_stats).await?;
        let deep_patterns = load_deep_patterns(&paths.deep_patterns).await?;

        Ok(Cached {
            rules: Arc::new(rules),
            training_data: Arc::new(training_data),
            feedback: Arc::new(feedback),
            learning_stats: Arc::new(learning_stats),
            deep_patterns: deep_patterns.map(Arc::new),
        })
    }

    /// Re-reads every file from disk and swaps the cache atomically.
    /// Requests already holding a snapshot via `rules()`/`training_data()`
    /// etc. keep the `Arc` they read; nothing in flight observes a
    /// half-updated state.
    pub async fn reload(&self) -> Result<()> {
        let fresh = Self::load_all(&self.paths, self.strict).await?;
        *self.cached.write() = fresh;
        Ok(())
    }

    /// Swaps in a freshly extracted deep-patterns snapshot without
    /// re-reading the other four files. Called by the Deep Learning
    /// agent's background extraction task, never by the request path.
    pub fn set_deep_patterns(&self, patterns: DeepPatterns) {
        self.cached.write().deep_patterns = Some(Arc::new(patterns));
    }

    pub fn rules(&self) -> Arc<RulesBundle> {
        self.cached.read().rules.clone()
    }

    pub fn training_data(&self) -> Arc<TrainingData> {
        self.cached.read().training_data.clone()
    }

    pub fn feedback(&self) -> Arc<FeedbackData> {
        self.cached.read().feedback.clone()
    }

    pub fn learning_stats(&self) -> Arc<LearningStatistics> {
        self.cached.read().learning_stats.clone()
    }

    pub fn deep_patterns(&self) -> Option<Arc<DeepPatterns>> {
        self.cached.read().deep_patterns.clone()
    }

    pub fn deep_patterns_path(&self) -> &str {
        &self.paths.deep_patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_with_defaults_when_nothing_on_disk() {
        let paths = StorePaths {
            rules: "/nonexistent/rules.json".to_string(),
            training_data: "/nonexistent/training-data.json".to_string(),
            feedback: "/nonexistent/feedback.json".to_string(),
            learning_stats: "/nonexistent/learning-stats.json".to_string(),
            deep_patterns: "/nonexistent/deep-patterns.json".to_string(),
        };
        let store = PersistenceStore::load(paths, false).await.unwrap();
        assert!(store.rules().forbidden_words.is_empty());
        assert!(store.deep_patterns().is_none());
    }
}
