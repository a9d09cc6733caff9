//! Conversation-Context Builder (C5, layer 5). Renders the history into
//! the final "chat-verlauf" prompt section, with an explicit marker of
//! the newest moderator and newest customer turn, and the hard rules
//! around context continuity spec.md §4.5 calls out.

use persona_core::HistoryMessage;

const MAX_RENDERED_TURNS: usize = 12;

const CONTINUITY_RULES: &str = "\
Regeln zur Gesprächskontinuität: Beziehe dich auf den tatsächlichen letzten Satz des Kunden, nicht auf \
ein älteres Thema. Ein kurzes \"ja\"/\"klar\"/\"gerne\" des Kunden ist eine Zustimmung zu deiner letzten \
Frage, kein neues Thema. Wiederhole keine Fakten, die der Kunde bereits genannt hat. Wenn \"wir\" \
mehrdeutig ist (du und der Kunde, oder eine dritte Partei), kläre den Bezug, bevor du fortfährst.";

#[derive(Debug, Clone)]
pub struct ConversationContextBlock {
    pub rendered_history: String,
    pub newest_moderator_turn: Option<String>,
    pub newest_customer_turn: Option<String>,
}

fn interleave<'a>(
    moderator: &'a [HistoryMessage],
    customer: &'a [HistoryMessage],
) -> Vec<(&'static str, &'a HistoryMessage)> {
    let mut combined: Vec<(&'static str, &'a HistoryMessage)> = moderator
        .iter()
        .map(|m| ("Moderator", m))
        .chain(customer.iter().map(|m| ("Kunde", m)))
        .collect();
    combined.sort_by_key(|(_, m)| m.timestamp);
    combined
}

pub fn run(moderator_messages: &[HistoryMessage], customer_messages: &[HistoryMessage]) -> ConversationContextBlock {
    let combined = interleave(moderator_messages, customer_messages);
    let recent: Vec<&(&str, &HistoryMessage)> = combined.iter().rev().take(MAX_RENDERED_TURNS).collect();

    let mut lines: Vec<String> = recent.iter().rev().map(|(who, m)| format!("{who}: {}", m.text)).collect();

    let newest_moderator_turn = moderator_messages.last().map(|m| m.text.clone());
    let newest_customer_turn = customer_messages.last().map(|m| m.text.clone());

    if let Some(turn) = &newest_moderator_turn {
        if let Some(last) = lines.iter_mut().rev().find(|l| l.ends_with(turn.as_str())) {
            *last = format!("{last}  [NEUESTE MODERATOR-NACHRICHT]");
        }
    }
    if let Some(turn) = &newest_customer_turn {
        if let Some(last) = lines.iter_mut().rev().find(|l| l.ends_with(turn.as_str())) {
            *last = format!("{last}  [NEUESTE KUNDEN-NACHRICHT]");
        }
    }

    let mut rendered_history = lines.join("\n");
    if !rendered_history.is_empty() {
        rendered_history.push_str("\n\n");
    }
    rendered_history.push_str(CONTINUITY_RULES);

    ConversationContextBlock { rendered_history, newest_moderator_turn, newest_customer_turn }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_newest_turn_from_each_side() {
        let moderator = vec![HistoryMessage { text: "Na, wie war dein Tag?".to_string(), timestamp: None }];
        let customer = vec![HistoryMessage { text: "Ganz gut, und bei dir?".to_string(), timestamp: None }];
        let block = run(&moderator, &customer);
        assert!(block.rendered_history.contains("[NEUESTE MODERATOR-NACHRICHT]"));
        assert!(block.rendered_history.contains("[NEUESTE KUNDEN-NACHRICHT]"));
    }

    #[test]
    fn caps_rendered_turns() {
        let moderator: Vec<HistoryMessage> =
            (0..20).map(|i| HistoryMessage { text: format!("M{i}"), timestamp: None }).collect();
        let block = run(&moderator, &[]);
        for i in 0..8 {
            assert!(!block.rendered_history.contains(&format!("M{i}\n")));
        }
    }

    #[test]
    fn empty_history_still_carries_continuity_rules() {
        let block = run(&[], &[]);
        assert!(block.rendered_history.contains("Gesprächskontinuität"));
    }
}
