//! Meta-Validator (C5, layer 4). Applies a small set of hard-coded policy
//! overrides that must never be left to the LLM's judgment: bot
//! accusations and moderator-outing always get a denial instruction, and
//! harmless profile-matching phrases are never treated as sexual innuendo.

use persona_config::templates::HARMLESS_COLLOCATION_WHITELIST;
use persona_core::Situation;

#[derive(Debug, Clone, Default)]
pub struct MetaValidatorResult {
    /// Extra instructions appended to the prompt, derived purely from
    /// policy, not from the LLM.
    pub policy_instructions: Vec<String>,
    /// True if a phrase from the harmless-collocation whitelist matched,
    /// meaning any "sexual" classification upstream should be discounted.
    pub harmless_collocation_matched: bool,
}

const BOT_DENIAL_INSTRUCTION: &str =
    "Weise den Vorwurf, ein Bot zu sein, glaubwürdig und locker zurück, ohne dich zu rechtfertigen.";
const MODERATOR_OUTING_DENIAL_INSTRUCTION: &str =
    "Weise die Unterstellung, Moderator oder bezahlter Mitarbeiter zu sein, glaubwürdig zurück.";

pub fn run(situations: &[Situation], customer_message: &str) -> MetaValidatorResult {
    let lower = customer_message.to_lowercase();
    let mut policy_instructions = vec![];

    if situations.iter().any(|s| s.as_str() == Situation::BOT_VORWURF) {
        policy_instructions.push(BOT_DENIAL_INSTRUCTION.to_string());
    }
    if situations.iter().any(|s| s.as_str() == Situation::MODERATOR_OUTING) {
        policy_instructions.push(MODERATOR_OUTING_DENIAL_INSTRUCTION.to_string());
    }

    let harmless_collocation_matched = HARMLESS_COLLOCATION_WHITELIST.iter().any(|p| lower.contains(p));

    MetaValidatorResult { policy_instructions, harmless_collocation_matched }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_accusation_gets_denial_instruction() {
        let situations = vec![Situation::from(Situation::BOT_VORWURF)];
        let result = run(&situations, "Bist du ein Bot?");
        assert_eq!(result.policy_instructions.len(), 1);
    }

    #[test]
    fn harmless_collocation_is_recognized() {
        let result = run(&[], "Vielleicht passen wir ja gut zusammen");
        assert!(result.harmless_collocation_matched);
    }

    #[test]
    fn plain_message_has_no_overrides() {
        let result = run(&[], "Wie geht es dir heute?");
        assert!(result.policy_instructions.is_empty());
        assert!(!result.harmless_collocation_matched);
    }
}
