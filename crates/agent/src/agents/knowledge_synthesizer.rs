//! Knowledge-Synthesizer (C5, layer 7). The last analysis-layer agent:
//! folds every prior blackboard entry (priority guidance, contextual
//! patterns, feedback, learning stats) plus this layer's rule results
//! into one `SynthesizedKnowledge` record the prompt composer reads
//! (spec.md §4.5).

use persona_core::{Priority, SynthesizedKnowledge};

use crate::agents::rule_interpreter::RuleInterpreterResult;
use crate::agents::rules_applicator::RulesApplicatorResult;
use crate::blackboard::Blackboard;

pub fn run(
    blackboard: &Blackboard,
    rule_interpreter: &RuleInterpreterResult,
    rules_applicator: &RulesApplicatorResult,
) -> SynthesizedKnowledge {
    let mut key_insights = vec![];
    let mut actionable_guidance = vec![];
    let mut priority_insights = vec![];

    for guidance in blackboard.get_priority(None) {
        match guidance.priority {
            Priority::High => priority_insights.push(guidance.guidance.clone()),
            Priority::Medium => actionable_guidance.push(guidance.guidance.clone()),
            Priority::Low => key_insights.push(guidance.guidance.clone()),
        }
    }

    for (situation, pattern) in blackboard.contextual_patterns() {
        for word in &pattern.words {
            key_insights.push(format!("{situation}: {word}"));
        }
    }

    actionable_guidance.extend(rules_applicator.situational_instructions.iter().cloned());
    priority_insights.extend(rules_applicator.critical_rules.iter().cloned());

    if let Some(guidance) = &rule_interpreter.guidance {
        actionable_guidance.push(guidance.clone());
    }

    let mut synthesized_knowledge = String::new();
    if !rules_applicator.general_rules.is_empty() {
        synthesized_knowledge.push_str(&rules_applicator.general_rules);
        synthesized_knowledge.push('\n');
    }
    synthesized_knowledge.push_str(&format!(
        "{} priorisierte Hinweise, {} Handlungsempfehlungen, {} Kernbeobachtungen.",
        priority_insights.len(),
        actionable_guidance.len(),
        key_insights.len()
    ));

    let knowledge = SynthesizedKnowledge { synthesized_knowledge, key_insights, actionable_guidance, priority_insights };
    blackboard.set_synthesized(knowledge.clone());
    knowledge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_priority_buckets_and_rule_outputs_into_synthesis() {
        let bb = Blackboard::new();
        bb.add_priority("Kritischer Hinweis", Priority::High, "test");
        bb.add_priority("Mittlerer Hinweis", Priority::Medium, "test");
        bb.add_priority("Kleiner Hinweis", Priority::Low, "test");

        let rule_interpreter = RuleInterpreterResult {
            priority: crate::agents::rule_interpreter::Priority::Examples,
            guidance: Some("Beispiele gewinnen bei Konflikten.".to_string()),
            success: true,
        };
        let rules_applicator = RulesApplicatorResult {
            situational_instructions: vec!["Lenke auf später um.".to_string()],
            critical_rules: vec!["Nie die eigene Nummer preisgeben.".to_string()],
            general_rules: "Bleib immer freundlich.".to_string(),
        };

        let knowledge = run(&bb, &rule_interpreter, &rules_applicator);
        assert!(knowledge.priority_insights.contains(&"Kritischer Hinweis".to_string()));
        assert!(knowledge.priority_insights.contains(&"Nie die eigene Nummer preisgeben.".to_string()));
        assert!(knowledge.actionable_guidance.contains(&"Lenke auf später um.".to_string()));
        assert!(knowledge.actionable_guidance.contains(&"Beispiele gewinnen bei Konflikten.".to_string()));
        assert!(knowledge.key_insights.contains(&"Kleiner Hinweis".to_string()));
        assert!(bb.get_synthesized().is_some());
    }
}
