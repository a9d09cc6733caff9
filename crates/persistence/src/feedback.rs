use persona_core::FeedbackData;

use crate::{read_json, PersistenceError};

/// Loads `feedback.json`. An empty/missing log is a normal boundary
/// case (spec.md §8): the learning-scoring step returns neutral and the
/// multi-candidate generator falls back to style-only weighting.
pub async fn load_feedback(path: &str) -> Result<FeedbackData, PersistenceError> {
    read_json(path, false).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_feedback_log_is_empty_not_an_error() {
        let data = load_feedback("/nonexistent/feedback.json").await.unwrap();
        assert!(data.feedbacks.is_empty());
    }
}
