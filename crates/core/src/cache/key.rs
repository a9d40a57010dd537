//! Deterministic cache-key construction.
//!
//! Every unique query gets its own slot while semantically identical
//! queries share one. Rules:
//!
//! - Text fields are lower-cased, so keys are case-insensitive.
//! - Absent optional fields serialize as empty segments rather than being
//!   omitted, keeping every segment at a fixed position so two distinct
//!   parameter combinations can never collapse into the same key.
//! - Each key family (and each headline fallback strategy) carries its own
//!   prefix, so families cannot collide with one another.

const PREFIX: &str = "kiosk";

fn lower(value: Option<&str>) -> String {
    value.unwrap_or_default().to_lowercase()
}

/// Key for a top-headlines query.
pub fn top_headlines(
    country: Option<&str>, category: Option<&str>, sources: Option<&str>, query: Option<&str>, page: u32,
    page_size: u32,
) -> String {
    format!(
        "{PREFIX}:top:c={}|cat={}|src={}|q={}|p={page}|ps={page_size}",
        lower(country),
        lower(category),
        lower(sources),
        lower(query),
    )
}

/// Key for a full-text "everything" search.
pub fn everything(
    query: &str, sources: Option<&str>, language: Option<&str>, sort_by: Option<&str>, from: Option<&str>,
    to: Option<&str>, page: u32, page_size: u32,
) -> String {
    format!(
        "{PREFIX}:all:q={}|src={}|lang={}|sort={}|from={}|to={}|p={page}|ps={page_size}",
        query.to_lowercase(),
        lower(sources),
        lower(language),
        lower(sort_by),
        from.unwrap_or_default(),
        to.unwrap_or_default(),
    )
}

/// Key for the sources listing.
pub fn sources(category: Option<&str>, language: Option<&str>, country: Option<&str>) -> String {
    format!("{PREFIX}:sources:cat={}|lang={}|c={}", lower(category), lower(language), lower(country))
}

/// Key for one strategy's slot in the country-headlines fallback chain.
///
/// The strategy name is part of the prefix so the per-strategy slots cannot
/// collide with each other or with the general families above.
pub fn headlines(strategy: &str, country: &str, category: &str, page: u32, page_size: u32) -> String {
    format!(
        "{PREFIX}:headlines:{strategy}:c={}|cat={}|p={page}|ps={page_size}",
        country.to_lowercase(),
        category.to_lowercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_queries_share_a_key() {
        let a = top_headlines(Some("us"), Some("general"), None, None, 1, 12);
        let b = top_headlines(Some("us"), Some("general"), None, None, 1, 12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_insensitive_on_text_fields() {
        let a = top_headlines(Some("US"), Some("General"), None, Some("Rust"), 1, 12);
        let b = top_headlines(Some("us"), Some("general"), None, Some("rust"), 1, 12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_params_distinct_keys() {
        let base = top_headlines(Some("us"), Some("general"), None, None, 1, 12);
        assert_ne!(base, top_headlines(Some("gb"), Some("general"), None, None, 1, 12));
        assert_ne!(base, top_headlines(Some("us"), Some("business"), None, None, 1, 12));
        assert_ne!(base, top_headlines(Some("us"), Some("general"), Some("bbc-news"), None, 1, 12));
        assert_ne!(base, top_headlines(Some("us"), Some("general"), None, Some("rust"), 1, 12));
        assert_ne!(base, top_headlines(Some("us"), Some("general"), None, None, 2, 12));
        assert_ne!(base, top_headlines(Some("us"), Some("general"), None, None, 1, 24));
    }

    #[test]
    fn test_absent_fields_hold_position() {
        // An absent field must not let neighbouring values shift into its
        // segment: (country="x", category="") != (country="", category="x").
        let a = top_headlines(Some("x"), None, None, None, 1, 12);
        let b = top_headlines(None, Some("x"), None, None, 1, 12);
        assert_ne!(a, b);
    }

    #[test]
    fn test_families_do_not_collide() {
        let top = top_headlines(None, None, None, Some("rust"), 1, 12);
        let all = everything("rust", None, None, None, None, None, 1, 12);
        let src = sources(None, None, None);
        assert_ne!(top, all);
        assert_ne!(top, src);
        assert_ne!(all, src);
    }

    #[test]
    fn test_everything_key_contents() {
        let key = everything("Rust", Some("wired"), Some("en"), Some("publishedAt"), Some("2024-01-01"), None, 2, 20);
        assert_eq!(key, "kiosk:all:q=rust|src=wired|lang=en|sort=publishedat|from=2024-01-01|to=|p=2|ps=20");
    }

    #[test]
    fn test_headline_strategies_get_distinct_slots() {
        let s1 = headlines("top-headlines", "fr", "technology", 1, 12);
        let s2 = headlines("sources", "fr", "technology", 1, 12);
        let s3 = headlines("search", "fr", "technology", 1, 12);
        assert_ne!(s1, s2);
        assert_ne!(s2, s3);
        assert_ne!(s1, s3);
    }

    #[test]
    fn test_headlines_key_case_insensitive() {
        let a = headlines("top-headlines", "FR", "Technology", 1, 12);
        let b = headlines("top-headlines", "fr", "technology", 1, 12);
        assert_eq!(a, b);
    }
}
