//! Retrieval query construction (step 1 of the retrieval algorithm).

use persona_config::templates::SITUATION_ANSWER_PATTERN_HINTS;
use persona_core::Situation;

fn answer_pattern_hints(situations: &[Situation]) -> Option<&'static str> {
    situations.iter().find_map(|s| {
        SITUATION_ANSWER_PATTERN_HINTS
            .iter()
            .find(|(key, _)| *key == s.as_str())
            .map(|(_, hint)| *hint)
    })
}

/// Builds the base query text: `"{topic}: {key_points}: {customer_message_prefix}"`,
/// with a `Treffen/Termine` prefix and trailing answer-pattern hints when
/// relevant.
pub fn build_query(
    topic: &str,
    key_points: &str,
    customer_message: &str,
    situations: &[Situation],
) -> String {
    let prefix_len = customer_message.chars().count().min(200);
    let customer_prefix: String = customer_message.chars().take(prefix_len).collect();
    let base = format!("{topic}: {key_points}: {customer_prefix}");

    let is_meeting = situations.iter().any(|s| s.as_str() == Situation::TREFFEN);
    let hints = answer_pattern_hints(situations);

    if is_meeting {
        let mut query = "Treffen Termine Besuch vorbeikommen zu mir zu dir: ".to_string();
        query.push_str(&base);
        if let Some(hint) = hints {
            query.push(' ');
            query.push_str(hint);
        }
        query
    } else {
        let mut query = base;
        if let Some(hint) = hints {
            query.push(' ');
            query.push_str(hint);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_situation_prefixes_query() {
        let situations = vec![Situation::from(Situation::TREFFEN)];
        let query = build_query("Alltag", "Wochenende", "Hast du Zeit für ein Treffen?", &situations);
        assert!(query.starts_with("Treffen Termine Besuch vorbeikommen zu mir zu dir:"));
        // the prefix and the per-situation answer-pattern hint happen to
        // be the same string for this situation, so both land in the query.
        assert_eq!(query.matches("Treffen Termine Besuch vorbeikommen zu mir zu dir").count(), 2);
    }

    #[test]
    fn non_meeting_query_appends_hints_inline() {
        let situations = vec![Situation::from(Situation::BILDER)];
        let query = build_query("Alltag", "Fotos", "Schickst du mir ein Bild?", &situations);
        assert!(query.starts_with("Alltag: Fotos:"));
        assert!(query.ends_with("Bilder Fotos schicken senden"));
    }
}
