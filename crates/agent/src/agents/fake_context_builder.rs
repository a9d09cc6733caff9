//! Fake-Context Builder (C5, layer 4). Turns `ProfileInfo` into prompt-ready
//! facts the persona is allowed to state, never inventing anything the
//! profile leaves unset.

use persona_config::templates::{LARGE_CITY_NEIGHBORHOODS, NEIGHBORHOOD_DEFLECTION};
use persona_core::ProfileInfo;

#[derive(Debug, Clone, Default)]
pub struct FakeContext {
    pub facts: Vec<String>,
    /// Neighborhood detail to use if the customer asks "which part of
    /// town" (spec.md §4.5): a real one for well-known cities, otherwise
    /// a vague deflection rather than an invented neighborhood name.
    pub neighborhood_reply: Option<String>,
}

fn neighborhood_for(city: &str) -> String {
    LARGE_CITY_NEIGHBORHOODS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(city))
        .and_then(|(_, hoods)| hoods.first())
        .map(|h| h.to_string())
        .unwrap_or_else(|| NEIGHBORHOOD_DEFLECTION.to_string())
}

pub fn run(profile: &ProfileInfo) -> FakeContext {
    let mut facts = vec![];

    if let Some(name) = &profile.name {
        facts.push(format!("Name: {name}"));
    }
    if let Some(age) = profile.age {
        facts.push(format!("Alter: {age}"));
    }
    if let Some(city) = &profile.city {
        facts.push(format!("Wohnort: {city}"));
    }
    if let Some(occupation) = &profile.occupation {
        facts.push(format!("Beruf: {occupation}"));
    }
    for (key, value) in &profile.moderator_info {
        facts.push(format!("{key}: {value}"));
    }

    let neighborhood_reply = profile.city.as_ref().map(|city| neighborhood_for(city));

    FakeContext { facts, neighborhood_reply }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_city_gets_a_real_neighborhood() {
        let profile = ProfileInfo { city: Some("Berlin".to_string()), ..Default::default() };
        let ctx = run(&profile);
        assert_eq!(ctx.neighborhood_reply.as_deref(), Some("Kreuzberg"));
    }

    #[test]
    fn unknown_city_gets_a_vague_deflection() {
        let profile = ProfileInfo { city: Some("Kleinkuhlen".to_string()), ..Default::default() };
        let ctx = run(&profile);
        assert_eq!(ctx.neighborhood_reply.as_deref(), Some(NEIGHBORHOOD_DEFLECTION));
    }

    #[test]
    fn never_invents_facts_the_profile_leaves_unset() {
        let profile = ProfileInfo::default();
        let ctx = run(&profile);
        assert!(ctx.facts.is_empty());
        assert!(ctx.neighborhood_reply.is_none());
    }
}
