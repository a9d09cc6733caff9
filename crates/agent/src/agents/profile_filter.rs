//! Profile Filter (C5, layer 3). Decides which persona/profile facts are
//! safe to surface for the current turn — e.g. suppressing a picture
//! reference when the profile has none, or an occupation claim the
//! profile never set. Downstream of Fake-Context Builder's hard rule
//! (never invent facts); this agent instead filters *existing* facts by
//! relevance and safety for the current message.

use persona_core::ProfileInfo;

#[derive(Debug, Clone, Default)]
pub struct ProfileFilterResult {
    /// Facts from the profile that are relevant and safe to mention this
    /// turn (a subset of what `FakeContextBuilder` would be willing to
    /// state at all).
    pub relevant_facts: Vec<String>,
    /// True when the customer asked about pictures but the profile has
    /// none — callers should route to a deflection rather than a
    /// picture-related reply.
    pub picture_request_unsupported: bool,
    pub success: bool,
}

impl ProfileFilterResult {
    pub fn fallback() -> Self {
        Self { relevant_facts: vec![], picture_request_unsupported: false, success: false }
    }
}

const PICTURE_KEYWORDS: &[&str] = &["bild", "foto", "pic", "selfie"];

pub fn run(profile: &ProfileInfo, customer_message: &str) -> ProfileFilterResult {
    let lower = customer_message.to_lowercase();
    let mut relevant_facts = vec![];

    if lower.contains("alt") || lower.contains("jahre") {
        if let Some(age) = profile.age {
            relevant_facts.push(format!("Alter: {age}"));
        }
    }
    if lower.contains("woher") || lower.contains("wohn") || lower.contains("stadt") {
        if let Some(city) = &profile.city {
            relevant_facts.push(format!("Wohnort: {city}"));
        }
    }
    if lower.contains("arbeit") || lower.contains("beruf") || lower.contains("job") {
        if let Some(occupation) = &profile.occupation {
            relevant_facts.push(format!("Beruf: {occupation}"));
        }
    }

    let picture_request_unsupported =
        PICTURE_KEYWORDS.iter().any(|k| lower.contains(k)) && !profile.has_pictures && !profile.has_profile_pic;

    ProfileFilterResult { relevant_facts, picture_request_unsupported, success: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaces_age_only_when_asked() {
        let profile = ProfileInfo { age: Some(27), ..Default::default() };
        let result = run(&profile, "Wie alt bist du?");
        assert!(result.relevant_facts.iter().any(|f| f.contains("27")));
    }

    #[test]
    fn flags_unsupported_picture_request() {
        let profile = ProfileInfo { has_pictures: false, has_profile_pic: false, ..Default::default() };
        let result = run(&profile, "Schick mir doch mal ein Foto");
        assert!(result.picture_request_unsupported);
    }

    #[test]
    fn does_not_flag_when_profile_has_pictures() {
        let profile = ProfileInfo { has_pictures: true, ..Default::default() };
        let result = run(&profile, "Schick mir doch mal ein Foto");
        assert!(!result.picture_request_unsupported);
    }

    #[test]
    fn irrelevant_message_surfaces_no_facts() {
        let profile = ProfileInfo { age: Some(27), city: Some("Berlin".to_string()), ..Default::default() };
        let result = run(&profile, "Wie war dein Wochenende?");
        assert!(result.relevant_facts.is_empty());
    }
}
