//! Prompt construction (C7). Three composer shapes share the same input
//! struct, built by the orchestrator from the blackboard snapshot at the
//! time of prompt composition (never updated mid-generation, per
//! spec.md §5 ordering guarantees).

pub mod composer;
pub mod finetuned;
pub mod simplified;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Everything a composer needs, already rendered to text by the
/// orchestrator's agents. Keeping this a flat data struct (rather than a
/// dependency on the blackboard type) keeps `persona-llm` free of a
/// dependency on `persona-agent`.
#[derive(Debug, Clone, Default)]
pub struct ComposerInput {
    /// §4.7 priority 1: open questions to answer; questions that must not
    /// be re-asked; reciprocity/confirmation requirement if applicable.
    pub hard_enforcement_preface: String,
    /// §4.7 priority 2: style reminder, forbidden-words block,
    /// situation-specific redirection blocks, first-message block.
    pub critical_rules: String,
    /// §4.7 priority 3.
    pub chat_history_block: String,
    /// §4.7 priority 4.
    pub training_data_block: String,
    /// §4.7 priority 5.
    pub learning_system_block: String,
    /// §4.7 priority 6.
    pub situations_block: String,
    /// §4.7 priority 7.
    pub context_block: String,
    /// §4.7 priority 8 (non-ASA only).
    pub customer_message_block: String,
    /// §4.7 priority 9.
    pub final_instructions_block: String,
    pub is_asa: bool,
}

impl ComposerInput {
    pub fn to_messages(&self) -> (String, String) {
        composer::compose(self)
    }
}
