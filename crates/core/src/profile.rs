use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persona ("fake profile") facts. Never invent fields this struct leaves
/// `None` — see `FakeContextBuilder` in `persona_agent::agents`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub has_profile_pic: bool,
    #[serde(default)]
    pub has_pictures: bool,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub is_new_customer: bool,
    #[serde(default)]
    pub moderator_info: HashMap<String, String>,
    #[serde(default)]
    pub customer_info: HashMap<String, String>,
}

/// Structured fields extracted from the conversation for both sides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedUserInfo {
    #[serde(default)]
    pub user: HashMap<String, String>,
    #[serde(default)]
    pub assistant: HashMap<String, String>,
}

/// The rules bundle for a persona/platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesBundle {
    #[serde(default)]
    pub forbidden_words: Vec<String>,
    #[serde(default)]
    pub preferred_words: Vec<String>,
    #[serde(default)]
    pub critical_rules: Vec<String>,
    /// Situation name -> instruction text.
    #[serde(default)]
    pub situational_responses: HashMap<String, String>,
    #[serde(default)]
    pub general_rules: String,
}

impl RulesBundle {
    /// `rules.forbidden_words` includes exceptions: `treffen` is never
    /// counted as a forbidden-word hit unless the message is itself a
    /// meeting-type reply. See spec.md §8 and §9 ("Forbidden-word matching").
    pub fn forbidden_word_hits(&self, text: &str, is_meeting_reply: bool) -> Vec<String> {
        let lower = text.to_lowercase();
        self.forbidden_words
            .iter()
            .filter(|w| {
                let w_lower = w.to_lowercase();
                if w_lower == "treffen" && !is_meeting_reply {
                    return false;
                }
                lower.contains(&w_lower)
            })
            .cloned()
            .collect()
    }
}
