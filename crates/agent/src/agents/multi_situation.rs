//! Multi-Situation Handler (C5, layer 5). When two or more situations are
//! detected in the same turn, emits a combined instruction so the
//! generator cannot silently ignore one of them. Carries a few targeted
//! templates for common pairs/triples; anything else falls back to a
//! generic "address all of these" instruction (spec.md §4.5).

use persona_core::Situation;

#[derive(Debug, Clone, Default)]
pub struct MultiSituationResult {
    pub instruction: Option<String>,
}

const GENERIC_TEMPLATE: &str =
    "Mehrere Themen wurden gleichzeitig angesprochen ({situations}). Gehe auf JEDES dieser Themen kurz ein, \
     ignoriere keines davon, auch wenn du die einzelnen Antworten kompakt hältst.";

fn has(situations: &[Situation], s: &str) -> bool {
    situations.iter().any(|x| x.as_str() == s)
}

/// Targeted combined-instruction templates for common situation pairs
/// (spec.md §4.5 Multi-Situation Handler).
fn targeted_template(situations: &[Situation]) -> Option<&'static str> {
    let kontaktdaten = has(situations, Situation::KONTAKTDATEN);
    let bilder = has(situations, Situation::BILDER);
    let treffen = has(situations, Situation::TREFFEN);
    let bot = has(situations, Situation::BOT_VORWURF);
    let geld = has(situations, Situation::GELD);

    if kontaktdaten && bilder && treffen {
        return Some(
            "Der Kunde fragt gleichzeitig nach Kontaktdaten, Bildern und einem Treffen. Lehne alle drei \
             freundlich ab, ohne eines der Themen zu überspringen, und lenke stattdessen auf ein Gesprächsthema um.",
        );
    }
    if kontaktdaten && bilder {
        return Some(
            "Der Kunde fragt nach Kontaktdaten UND Bildern. Weiche bei beidem freundlich aus, ohne eines \
             der beiden Themen unbeantwortet zu lassen.",
        );
    }
    if kontaktdaten && treffen {
        return Some(
            "Der Kunde fragt nach Kontaktdaten UND einem Treffen. Lehne beides ohne konkrete Zusage ab \
             und biete stattdessen an, hier weiterzuschreiben.",
        );
    }
    if bilder && treffen {
        return Some(
            "Der Kunde fragt nach Bildern UND einem Treffen. Gehe auf beides ein, ohne Bilder zu versprechen \
             oder einen Termin zuzusagen.",
        );
    }
    if bot && (kontaktdaten || bilder || treffen || geld) {
        return Some(
            "Der Kunde unterstellt, du seist ein Bot, UND stellt eine weitere Forderung. Weise den Bot-Vorwurf \
             zurück und behandle die zweite Forderung separat, ohne sie zu ignorieren.",
        );
    }
    if geld && (kontaktdaten || bilder || treffen) {
        return Some(
            "Der Kunde spricht Geld/Coins UND ein weiteres Thema an. Gehe auf Geld/Coins klar ablehnend ein \
             und beantworte das zweite Thema getrennt davon.",
        );
    }
    None
}

pub fn run(situations: &[Situation]) -> MultiSituationResult {
    if situations.len() < 2 {
        return MultiSituationResult { instruction: None };
    }

    if let Some(template) = targeted_template(situations) {
        return MultiSituationResult { instruction: Some(template.to_string()) };
    }

    let names: Vec<&str> = situations.iter().map(|s| s.as_str()).collect();
    MultiSituationResult {
        instruction: Some(GENERIC_TEMPLATE.replace("{situations}", &names.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_situation_produces_no_instruction() {
        let situations = vec![Situation::from(Situation::TREFFEN)];
        assert!(run(&situations).instruction.is_none());
    }

    #[test]
    fn contact_and_pictures_uses_targeted_template() {
        let situations = vec![Situation::from(Situation::KONTAKTDATEN), Situation::from(Situation::BILDER)];
        let result = run(&situations);
        assert!(result.instruction.unwrap().contains("Kontaktdaten UND Bildern"));
    }

    #[test]
    fn unmatched_combination_falls_back_to_generic_template() {
        let situations = vec![Situation::from(Situation::BERUF), Situation::from(Situation::STANDORT)];
        let result = run(&situations);
        assert!(result.instruction.unwrap().contains("JEDES dieser Themen"));
    }
}
