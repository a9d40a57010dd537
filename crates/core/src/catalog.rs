//! Static reference tables for the news catalog.
//!
//! Countries, categories, languages, and the curated per-country source
//! lists are immutable mapping data built once at first use. The curated
//! lists exist because the upstream API's direct country filter has uneven
//! coverage; for mapped countries a hand-vetted source list is a more
//! reliable second attempt.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Categories accepted by the top-headlines endpoint.
pub const CATEGORIES: &[&str] =
    &["general", "business", "entertainment", "health", "science", "sports", "technology"];

/// Country codes offered in the UI, with display names.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("us", "United States"),
    ("gb", "United Kingdom"),
    ("au", "Australia"),
    ("ca", "Canada"),
    ("in", "India"),
    ("de", "Germany"),
    ("fr", "France"),
    ("it", "Italy"),
    ("jp", "Japan"),
    ("br", "Brazil"),
    ("mx", "Mexico"),
    ("za", "South Africa"),
    ("ae", "UAE"),
    ("sg", "Singapore"),
    ("nz", "New Zealand"),
];

/// Sort orders accepted by the everything endpoint, with display labels.
pub const SORT_OPTIONS: &[(&str, &str)] =
    &[("publishedAt", "Newest First"), ("relevancy", "Most Relevant"), ("popularity", "Most Popular")];

/// Languages offered in the search UI.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("ar", "Arabic"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("zh", "Chinese"),
];

/// Dominant language per country, used by the broad keyword fallback.
static COUNTRY_LANGUAGE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("us", "en"),
        ("gb", "en"),
        ("au", "en"),
        ("ca", "en"),
        ("nz", "en"),
        ("sg", "en"),
        ("za", "en"),
        ("in", "en"),
        ("de", "de"),
        ("at", "de"),
        ("fr", "fr"),
        ("it", "it"),
        ("br", "pt"),
        ("pt", "pt"),
        ("mx", "es"),
        ("ar", "es"),
        ("jp", "ja"),
        ("ae", "ar"),
        ("sa", "ar"),
        ("ru", "ru"),
        ("cn", "zh"),
    ])
});

/// Curated well-known source ids per country, used when the direct country
/// filter returns too little.
static COUNTRY_SOURCES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("us", [
            "associated-press",
            "reuters",
            "the-washington-post",
            "the-new-york-times",
            "cnn",
            "fox-news",
            "usa-today",
            "abc-news",
            "nbc-news",
            "cbs-news",
            "axios",
            "politico",
        ]
        .as_slice()),
        ("gb", [
            "bbc-news",
            "the-guardian-uk",
            "the-telegraph",
            "independent",
            "mirror",
            "the-sun",
            "sky-news",
            "the-times",
            "financial-times",
        ]
        .as_slice()),
        ("au", ["abc-news-au", "australian-financial-review", "news-com-au", "the-sydney-morning-herald"].as_slice()),
        ("ca", ["cbc-news", "financial-post", "the-globe-and-mail", "national-post"].as_slice()),
        ("in", ["the-times-of-india", "the-hindu", "india-today", "ndtv", "economic-times"].as_slice()),
        ("de", ["der-tagesspiegel", "die-zeit", "focus", "handelsblatt", "spiegel-online", "t3n", "wired-de"].as_slice()),
        ("fr", ["le-monde", "liberation", "les-echos"].as_slice()),
        ("it", ["ansa", "il-sole-24-ore", "la-repubblica"].as_slice()),
        ("jp", ["asahi-shimbun"].as_slice()),
        ("br", ["globo", "ig-news", "infodinero"].as_slice()),
        ("mx", ["la-jornada", "proceso"].as_slice()),
        ("za", ["news24", "the-citizen-za"].as_slice()),
        ("ae", ["the-national"].as_slice()),
        ("sg", ["channel-news-asia"].as_slice()),
        ("nz", ["news-com-au"].as_slice()), // closest available
    ])
});

/// Category icon classes for the view layer.
static CATEGORY_ICONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("general", "fa-newspaper"),
        ("business", "fa-briefcase"),
        ("entertainment", "fa-film"),
        ("health", "fa-heart-pulse"),
        ("science", "fa-flask"),
        ("sports", "fa-trophy"),
        ("technology", "fa-microchip"),
    ])
});

/// Maximum source ids the upstream API accepts in one request.
const MAX_SOURCES_PER_REQUEST: usize = 20;

/// Comma-joined curated source ids for a country code, capped at the
/// upstream limit. `None` when the country is unmapped.
pub fn sources_for_country(country: &str) -> Option<String> {
    let sources = COUNTRY_SOURCES.get(country.to_lowercase().as_str())?;
    if sources.is_empty() {
        return None;
    }
    Some(sources.iter().take(MAX_SOURCES_PER_REQUEST).copied().collect::<Vec<_>>().join(","))
}

/// Dominant language for a country code, defaulting to English.
pub fn language_for_country(country: &str) -> &'static str {
    COUNTRY_LANGUAGE.get(country.to_lowercase().as_str()).copied().unwrap_or("en")
}

/// Display name for a country code, falling back to the upper-cased code.
pub fn country_display_name(country: &str) -> String {
    let code = country.to_lowercase();
    COUNTRIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| country.to_uppercase())
}

/// Icon class for a category, with a newspaper fallback.
pub fn category_icon(category: &str) -> &'static str {
    CATEGORY_ICONS.get(category.to_lowercase().as_str()).copied().unwrap_or("fa-newspaper")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_for_mapped_country() {
        let joined = sources_for_country("fr").unwrap();
        assert_eq!(joined, "le-monde,liberation,les-echos");
    }

    #[test]
    fn test_sources_for_country_case_insensitive() {
        assert_eq!(sources_for_country("FR"), sources_for_country("fr"));
    }

    #[test]
    fn test_sources_for_unmapped_country() {
        assert_eq!(sources_for_country("kr"), None);
    }

    #[test]
    fn test_sources_capped_at_upstream_limit() {
        for (country, _) in COUNTRIES {
            if let Some(joined) = sources_for_country(country) {
                assert!(joined.split(',').count() <= MAX_SOURCES_PER_REQUEST);
            }
        }
    }

    #[test]
    fn test_language_for_country() {
        assert_eq!(language_for_country("fr"), "fr");
        assert_eq!(language_for_country("jp"), "ja");
        assert_eq!(language_for_country("br"), "pt");
    }

    #[test]
    fn test_language_defaults_to_english() {
        assert_eq!(language_for_country("zz"), "en");
    }

    #[test]
    fn test_country_display_name() {
        assert_eq!(country_display_name("fr"), "France");
        assert_eq!(country_display_name("US"), "United States");
        assert_eq!(country_display_name("zz"), "ZZ");
    }

    #[test]
    fn test_category_icon_fallback() {
        assert_eq!(category_icon("science"), "fa-flask");
        assert_eq!(category_icon("unknown"), "fa-newspaper");
    }
}
