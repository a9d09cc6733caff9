use persona_core::LearningStatistics;

use crate::{read_json, PersistenceError};

/// Loads `learning-stats.json`, the derived statistics computed
/// out-of-band from the feedback log (spec.md §3, §6). Missing is a
/// normal boundary case: every accessor on `LearningStatistics` is a
/// total function with a neutral default, so an empty statistics object
/// degrades gracefully rather than erroring.
pub async fn load_learning_stats(path: &str) -> Result<LearningStatistics, PersistenceError> {
    read_json(path, false).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_stats_file_yields_neutral_default() {
        let stats = load_learning_stats("/nonexistent/learning-stats.json").await.unwrap();
        assert!(stats.word_frequencies.is_empty());
        assert_eq!(stats.word_score("allgemein", "huhu").ratio(), 0.5);
    }
}
