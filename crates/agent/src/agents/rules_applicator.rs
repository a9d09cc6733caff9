//! Rules-Applicator (C5, layer 7). Surfaces the situational instruction
//! text for each detected situation plus the always-on critical rules,
//! and records forbidden-word hits so the validation stage (C9) can
//! gate on them later (spec.md §4.5, §8).

use persona_core::{RulesBundle, Situation};

#[derive(Debug, Clone, Default)]
pub struct RulesApplicatorResult {
    /// Situational instruction text, in situation priority order.
    pub situational_instructions: Vec<String>,
    pub critical_rules: Vec<String>,
    pub general_rules: String,
}

pub fn run(rules: &RulesBundle, situations: &[Situation]) -> RulesApplicatorResult {
    let situational_instructions = situations
        .iter()
        .filter_map(|s| rules.situational_responses.get(s.as_str()))
        .cloned()
        .collect();

    RulesApplicatorResult {
        situational_instructions,
        critical_rules: rules.critical_rules.clone(),
        general_rules: rules.general_rules.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn collects_instructions_for_matched_situations_only() {
        let mut situational_responses = HashMap::new();
        situational_responses.insert(Situation::TREFFEN.to_string(), "Lenke auf später um.".to_string());
        let rules = RulesBundle {
            situational_responses,
            critical_rules: vec!["Gib niemals die eigene Telefonnummer preis.".to_string()],
            ..Default::default()
        };
        let situations = vec![Situation::from(Situation::TREFFEN), Situation::from(Situation::BERUF)];
        let result = run(&rules, &situations);
        assert_eq!(result.situational_instructions, vec!["Lenke auf später um.".to_string()]);
        assert_eq!(result.critical_rules.len(), 1);
    }

    #[test]
    fn no_situations_yields_empty_instructions() {
        let rules = RulesBundle::default();
        let result = run(&rules, &[]);
        assert!(result.situational_instructions.is_empty());
    }
}
