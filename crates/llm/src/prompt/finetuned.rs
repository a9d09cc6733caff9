//! The minimal prompt shape for fine-tuned backends: the model already
//! knows the domain and house style from training, so the prompt only
//! needs to carry hard rules plus the two most recent turns. Also used
//! verbatim as stage 3's prompt in the four-stage pipeline.

#[derive(Debug, Clone, Default)]
pub struct FinetunedComposerInput {
    pub hard_rules: String,
    pub last_moderator_message: String,
    pub last_customer_message: String,
    pub one_shot_example: Option<(String, String)>,
}

/// Returns `(system_prompt, user_prompt)`.
pub fn compose_finetuned(input: &FinetunedComposerInput) -> (String, String) {
    let system = input.hard_rules.clone();

    let mut user = String::new();
    if let Some((du, kunde)) = &input.one_shot_example {
        user.push_str(&format!("Du: \"{du}\"\nKunde: \"{kunde}\"\n\n"));
    }
    user.push_str(&format!("Du: \"{}\"\n", input.last_moderator_message));
    user.push_str(&format!("Kunde: \"{}\"\n", input.last_customer_message));
    user.push_str("Antworte als Chat-Moderator.");

    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_example_block_when_absent() {
        let input = FinetunedComposerInput {
            hard_rules: "RULES".to_string(),
            last_moderator_message: "Hallo!".to_string(),
            last_customer_message: "Hey, wie geht's?".to_string(),
            one_shot_example: None,
        };
        let (system, user) = compose_finetuned(&input);
        assert_eq!(system, "RULES");
        assert!(!user.contains("\n\nDu: \""));
        assert!(user.starts_with("Du: \"Hallo!\""));
    }

    #[test]
    fn includes_one_shot_example_before_turn() {
        let input = FinetunedComposerInput {
            hard_rules: "RULES".to_string(),
            last_moderator_message: "Na du?".to_string(),
            last_customer_message: "Ganz gut!".to_string(),
            one_shot_example: Some(("Beispiel-Moderator".to_string(), "Beispiel-Kunde".to_string())),
        };
        let (_, user) = compose_finetuned(&input);
        assert!(user.find("Beispiel-Moderator").unwrap() < user.find("Na du?").unwrap());
    }
}
