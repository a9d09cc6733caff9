use persona_core::RulesBundle;

use crate::{read_json, PersistenceError};

/// Loads `rules.json` (spec.md §6). Required in strict environments: a
/// missing rules file in `Production`/`Staging` is a startup error,
/// checked by the caller via `persona_config::Settings::validate`-style
/// gating, not here — this loader itself only distinguishes
/// missing-is-fatal via `required`.
pub async fn load_rules(path: &str, required: bool) -> Result<RulesBundle, PersistenceError> {
    read_json(path, required).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_rules_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"forbidden_words": ["nummer"], "preferred_words": [], "critical_rules": [], "situational_responses": {{}}, "general_rules": "sei nett"}}"#
        )
        .unwrap();
        let rules = load_rules(file.path().to_str().unwrap(), true).await.unwrap();
        assert_eq!(rules.forbidden_words, vec!["nummer".to_string()]);
    }

    #[tokio::test]
    async fn missing_optional_file_yields_default() {
        let rules = load_rules("/nonexistent/rules.json", false).await.unwrap();
        assert!(rules.forbidden_words.is_empty());
    }
}
