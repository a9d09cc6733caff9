use persona_core::TrainingData;

use crate::{read_json, PersistenceError};

/// Loads `training-data.json` (`conversations` + `asaExamples`, spec.md §6).
pub async fn load_training_data(path: &str, required: bool) -> Result<TrainingData, PersistenceError> {
    read_json(path, required).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_conversations_and_asa_examples() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"conversations": [{{"customer_message": "Hi", "moderator_response": "Na du?"}}],
                "asaExamples": [{{"customer_message": "", "asa_message": "Na, was machst du gerade?"}}]}}"#
        )
        .unwrap();
        let data = load_training_data(file.path().to_str().unwrap(), true).await.unwrap();
        assert_eq!(data.conversations.len(), 1);
        assert_eq!(data.asa_examples.len(), 1);
    }
}
