//! The "simplified / global-style" composer (C7, second shape). Used
//! when a pre-extracted global style is available; trades the full
//! section stack for a compact, style-led prompt with a chain-of-thought
//! scaffold.

use persona_core::WritingStyleFeatures;

#[derive(Debug, Clone, Default)]
pub struct SimplifiedComposerInput {
    pub style: WritingStyleFeatures,
    pub examples_block: String,
    pub context_block: String,
    pub rules_block: String,
    pub special_block: String,
    pub last_moderator_message: String,
    pub last_customer_message: String,
    pub recent_turns: Vec<String>,
    pub open_questions: Vec<String>,
    pub answered_questions: Vec<String>,
}

/// Returns `(system_prompt, user_prompt)`. The roughly 30/20/20/20/10
/// share (style/examples/context/rules/special) described in spec.md
/// §4.7 is realized as section order and relative verbosity rather than
/// a literal character budget.
pub fn compose_simplified(input: &SimplifiedComposerInput) -> (String, String) {
    let mut system = String::new();
    system.push_str("Schreibe im folgenden Stil:\n");
    system.push_str(&format!(
        "- Durchschnittliche Satzlänge: {:.0} Wörter, {:.1} Sätze pro Antwort\n",
        input.style.mean_sentence_length_words, input.style.mean_sentence_count
    ));
    system.push_str(&format!(
        "- Formalität: {:?}, Direktheit: {:?}\n",
        input.style.dominant_formality, input.style.dominant_directness
    ));
    if !input.style.common_sentence_starts.is_empty() {
        system.push_str(&format!(
            "- Übliche Satzanfänge: {}\n",
            input.style.common_sentence_starts.join(", ")
        ));
    }
    if !input.rules_block.is_empty() {
        system.push_str("\n");
        system.push_str(&input.rules_block);
    }

    let mut user = String::new();
    user.push_str("## Kontext\n");
    user.push_str(&format!("Letzte Moderator-Nachricht: \"{}\"\n", input.last_moderator_message));
    user.push_str(&format!("Letzte Kunden-Nachricht: \"{}\"\n", input.last_customer_message));
    if !input.recent_turns.is_empty() {
        user.push_str("Letzte Verlaufszeilen:\n");
        for turn in input.recent_turns.iter().take(4) {
            user.push_str(&format!("- {turn}\n"));
        }
    }
    if !input.open_questions.is_empty() {
        user.push_str(&format!(
            "Offene Fragen, die beantwortet werden müssen: {}\n",
            input.open_questions.join("; ")
        ));
    }
    if !input.answered_questions.is_empty() {
        user.push_str(&format!(
            "Bereits beantwortete Fragen, NICHT erneut stellen: {}\n",
            input.answered_questions.join("; ")
        ));
    }
    if !input.examples_block.is_empty() {
        user.push_str("\n## Beispiele\n");
        user.push_str(&input.examples_block);
    }
    if !input.context_block.is_empty() {
        user.push_str("\n## Weiterer Kontext\n");
        user.push_str(&input.context_block);
    }
    if !input.special_block.is_empty() {
        user.push_str("\n## Besonderheiten\n");
        user.push_str(&input.special_block);
    }
    user.push_str(
        "\n## Vorgehen\n\
         1. Verstehe den Kontext der letzten Nachrichten.\n\
         2. Prüfe die Logik: Ist deine Antwort eine sinnvolle Fortsetzung?\n\
         3. Generiere die Antwort im oben beschriebenen Stil.\n",
    );

    (system, user)
}
