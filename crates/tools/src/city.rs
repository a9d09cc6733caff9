use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use persona_core::{CityLookup, Result};

/// A small static adjacency table of German cities to a plausible nearby
/// city. A production deployment replaces this with a real geocoding
/// service behind the same trait (spec.md §1, "city-geocoding helper" is
/// an external collaborator).
static NEARBY_CITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("köln", "Leverkusen"),
        ("koeln", "Leverkusen"),
        ("berlin", "Potsdam"),
        ("hamburg", "Pinneberg"),
        ("münchen", "Dachau"),
        ("muenchen", "Dachau"),
        ("frankfurt", "Offenbach"),
        ("stuttgart", "Esslingen"),
        ("leipzig", "Markkleeberg"),
        ("düsseldorf", "Neuss"),
        ("duesseldorf", "Neuss"),
        ("dortmund", "Bochum"),
        ("essen", "Mülheim"),
        ("bremen", "Delmenhorst"),
        ("hannover", "Langenhagen"),
        ("nürnberg", "Fürth"),
        ("nuernberg", "Fürth"),
    ])
});

pub struct StaticCityLookup;

#[async_trait]
impl CityLookup for StaticCityLookup {
    async fn find_nearby(&self, city_name: &str) -> Result<Option<String>> {
        let key = city_name.trim().to_lowercase();
        Ok(NEARBY_CITIES.get(key.as_str()).map(|s| s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_city() {
        let lookup = StaticCityLookup;
        assert_eq!(lookup.find_nearby("Köln").await.unwrap(), Some("Leverkusen".to_string()));
    }

    #[tokio::test]
    async fn returns_none_for_unknown_city() {
        let lookup = StaticCityLookup;
        assert_eq!(lookup.find_nearby("Nirgendwo").await.unwrap(), None);
    }
}
