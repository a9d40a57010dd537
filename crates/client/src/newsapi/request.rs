//! NewsAPI request types and validation.
//!
//! Requests serialize directly into query strings via `reqwest`'s `query`;
//! absent optionals are omitted from the wire entirely.

use serde::Serialize;

use crate::newsapi::NewsApiError;

/// Sort orders accepted by the everything endpoint.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    /// Wire name, also used for cache-key construction.
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }

    /// Parse a route parameter, falling back to newest-first.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "relevancy" => SortBy::Relevancy,
            "popularity" => SortBy::Popularity,
            _ => SortBy::PublishedAt,
        }
    }
}

/// Parameters for the top-headlines endpoint.
///
/// The upstream API forbids combining `sources` with `country`/`category`;
/// `validate` enforces that before anything goes on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct TopHeadlinesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Comma-separated source ids, max 20.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    pub page: u32,

    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl Default for TopHeadlinesRequest {
    fn default() -> Self {
        Self { country: None, category: None, sources: None, q: None, page: 1, page_size: 12 }
    }
}

impl TopHeadlinesRequest {
    pub fn validate(&self) -> Result<(), NewsApiError> {
        validate_paging(self.page, self.page_size)?;

        if self.sources.is_some() && (self.country.is_some() || self.category.is_some()) {
            return Err(NewsApiError::InvalidRequest(
                "sources cannot be combined with country or category".into(),
            ));
        }

        if let Some(sources) = &self.sources
            && sources.split(',').count() > 20
        {
            return Err(NewsApiError::InvalidRequest("at most 20 sources per request".into()));
        }

        Ok(())
    }
}

/// Parameters for the everything (full-text search) endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EverythingRequest {
    pub q: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,

    /// Earliest publication date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Latest publication date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    pub page: u32,

    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl Default for EverythingRequest {
    fn default() -> Self {
        Self { q: String::new(), sources: None, language: None, sort_by: None, from: None, to: None, page: 1, page_size: 12 }
    }
}

impl EverythingRequest {
    pub fn validate(&self) -> Result<(), NewsApiError> {
        if self.q.trim().is_empty() {
            return Err(NewsApiError::InvalidRequest("query cannot be empty".into()));
        }

        validate_paging(self.page, self.page_size)?;

        for date in [&self.from, &self.to].into_iter().flatten() {
            validate_date(date)?;
        }

        Ok(())
    }
}

/// Parameters for the sources listing endpoint. All filters optional.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SourcesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

fn validate_paging(page: u32, page_size: u32) -> Result<(), NewsApiError> {
    if page == 0 {
        return Err(NewsApiError::InvalidRequest("page must be at least 1".into()));
    }
    if page_size == 0 || page_size > 100 {
        return Err(NewsApiError::InvalidRequest("pageSize must be 1-100".into()));
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<(), NewsApiError> {
    let date_regex = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex");
    if date_regex.is_match(date) {
        Ok(())
    } else {
        Err(NewsApiError::InvalidRequest(format!("invalid date format: {date} (expected YYYY-MM-DD)")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_top_headlines_request() {
        let req = TopHeadlinesRequest {
            country: Some("us".into()),
            category: Some("general".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_sources_exclusive_with_country() {
        let req = TopHeadlinesRequest {
            country: Some("us".into()),
            sources: Some("cnn".into()),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(NewsApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_sources_exclusive_with_category() {
        let req = TopHeadlinesRequest {
            category: Some("business".into()),
            sources: Some("cnn".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_too_many_sources() {
        let ids: Vec<String> = (0..21).map(|i| format!("source-{i}")).collect();
        let req = TopHeadlinesRequest { sources: Some(ids.join(",")), ..Default::default() };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_page_zero_rejected() {
        let req = TopHeadlinesRequest { page: 0, ..Default::default() };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        let req = TopHeadlinesRequest { page_size: 0, ..Default::default() };
        assert!(req.validate().is_err());
        let req = TopHeadlinesRequest { page_size: 101, ..Default::default() };
        assert!(req.validate().is_err());
        let req = TopHeadlinesRequest { page_size: 100, ..Default::default() };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_everything_empty_query() {
        let req = EverythingRequest { q: "   ".into(), ..Default::default() };
        assert!(matches!(req.validate(), Err(NewsApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_everything_valid_dates() {
        let req = EverythingRequest {
            q: "rust".into(),
            from: Some("2024-01-01".into()),
            to: Some("2024-12-31".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_everything_invalid_date() {
        let req = EverythingRequest { q: "rust".into(), from: Some("01/01/2024".into()), ..Default::default() };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sort_by_wire_names() {
        assert_eq!(SortBy::PublishedAt.as_str(), "publishedAt");
        assert_eq!(SortBy::Relevancy.as_str(), "relevancy");
        assert_eq!(SortBy::Popularity.as_str(), "popularity");
    }

    #[test]
    fn test_sort_by_parse_or_default() {
        assert_eq!(SortBy::parse_or_default("relevancy"), SortBy::Relevancy);
        assert_eq!(SortBy::parse_or_default("popularity"), SortBy::Popularity);
        assert_eq!(SortBy::parse_or_default("bogus"), SortBy::PublishedAt);
    }

    #[test]
    fn test_query_string_serialization() {
        let req = TopHeadlinesRequest { country: Some("fr".into()), category: Some("technology".into()), ..Default::default() };
        let qs = serde_json::to_value(&req).unwrap();
        assert_eq!(qs["country"], "fr");
        assert_eq!(qs["pageSize"], 12);
        assert!(qs.get("sources").is_none());

        let req = EverythingRequest { q: "rust".into(), sort_by: Some(SortBy::PublishedAt), ..Default::default() };
        let qs = serde_json::to_value(&req).unwrap();
        assert_eq!(qs["sortBy"], "publishedAt");
    }
}
