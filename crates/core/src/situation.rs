use serde::{Deserialize, Serialize};

/// A situation label. The fixed taxonomy below always exists; a rules
/// bundle may add further named situations via
/// `RulesBundle::situational_responses` keys, which sort after the fixed
/// taxonomy when ordering a detected list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Situation(pub String);

impl Situation {
    pub const TREFFEN: &'static str = "Treffen/Termine";
    pub const KONTAKTDATEN: &'static str = "Kontaktdaten außerhalb der Plattform";
    pub const BILDER: &'static str = "Bilder Anfrage";
    pub const GELD: &'static str = "Geld/Coins";
    pub const SEXUELLE_THEMEN: &'static str = "Sexuelle Themen";
    pub const BOT_VORWURF: &'static str = "Bot-Vorwurf";
    pub const STANDORT: &'static str = "Standort";
    pub const BERUF: &'static str = "Beruf";
    pub const MODERATOR_OUTING: &'static str = "Moderator-Outing";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Priority ordering per spec.md §4.5 Situation Detector. Unknown
    /// (rules-bundle-defined) situations sort after the fixed taxonomy,
    /// in the order they were supplied.
    fn fixed_priority(&self) -> Option<usize> {
        const ORDER: [&str; 9] = [
            Situation::TREFFEN,
            Situation::KONTAKTDATEN,
            Situation::BILDER,
            Situation::GELD,
            Situation::SEXUELLE_THEMEN,
            Situation::BOT_VORWURF,
            Situation::STANDORT,
            Situation::BERUF,
            Situation::MODERATOR_OUTING,
        ];
        ORDER.iter().position(|s| *s == self.0)
    }
}

impl From<&str> for Situation {
    fn from(value: &str) -> Self {
        Situation(value.to_string())
    }
}

/// Sorts a detected situation list into the priority order spec.md
/// demands, stable with respect to ties (rules-defined situations keep
/// their detection order, appended after the fixed taxonomy).
pub fn sort_by_priority(situations: &mut Vec<Situation>) {
    situations.sort_by_key(|s| s.fixed_priority().unwrap_or(usize::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_fixed_taxonomy_by_priority() {
        let mut s = vec![
            Situation::from(Situation::BERUF),
            Situation::from(Situation::TREFFEN),
            Situation::from(Situation::GELD),
        ];
        sort_by_priority(&mut s);
        assert_eq!(
            s,
            vec![
                Situation::from(Situation::TREFFEN),
                Situation::from(Situation::GELD),
                Situation::from(Situation::BERUF),
            ]
        );
    }

    #[test]
    fn unknown_situations_sort_last_in_detection_order() {
        let mut s = vec![
            Situation::from("custom_b"),
            Situation::from(Situation::STANDORT),
            Situation::from("custom_a"),
        ];
        sort_by_priority(&mut s);
        assert_eq!(s[0], Situation::from(Situation::STANDORT));
        assert_eq!(s[1], Situation::from("custom_b"));
        assert_eq!(s[2], Situation::from("custom_a"));
    }
}
