//! The "legacy structured" composer: every §5 section, in priority
//! order, split across a system prompt (hard rules) and a user prompt
//! (conversation-specific context).

use super::ComposerInput;

/// Returns `(system_prompt, user_prompt)`.
pub fn compose(input: &ComposerInput) -> (String, String) {
    let mut system = String::new();
    if !input.hard_enforcement_preface.is_empty() {
        system.push_str(&input.hard_enforcement_preface);
        system.push_str("\n\n");
    }
    system.push_str(&input.critical_rules);

    let mut user = String::new();
    for block in [
        &input.chat_history_block,
        &input.training_data_block,
        &input.learning_system_block,
        &input.situations_block,
        &input.context_block,
    ] {
        if !block.is_empty() {
            user.push_str(block);
            user.push_str("\n\n");
        }
    }
    if !input.is_asa && !input.customer_message_block.is_empty() {
        user.push_str(&input.customer_message_block);
        user.push_str("\n\n");
    }
    user.push_str(&input.final_instructions_block);

    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_section_priority_order() {
        let input = ComposerInput {
            hard_enforcement_preface: "PREFACE".to_string(),
            critical_rules: "RULES".to_string(),
            chat_history_block: "HISTORY".to_string(),
            training_data_block: "EXAMPLES".to_string(),
            learning_system_block: "LEARNING".to_string(),
            situations_block: "SITUATIONS".to_string(),
            context_block: "CONTEXT".to_string(),
            customer_message_block: "CUSTOMER".to_string(),
            final_instructions_block: "FINAL".to_string(),
            is_asa: false,
        };
        let (system, user) = compose(&input);
        assert!(system.find("PREFACE").unwrap() < system.find("RULES").unwrap());
        let order = ["HISTORY", "EXAMPLES", "LEARNING", "SITUATIONS", "CONTEXT", "CUSTOMER", "FINAL"];
        let positions: Vec<usize> = order.iter().map(|s| user.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn asa_requests_skip_customer_message_block() {
        let input = ComposerInput {
            customer_message_block: "CUSTOMER".to_string(),
            final_instructions_block: "FINAL".to_string(),
            is_asa: true,
            ..Default::default()
        };
        let (_, user) = compose(&input);
        assert!(!user.contains("CUSTOMER"));
    }
}
