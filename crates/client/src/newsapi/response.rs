//! NewsAPI response types and article normalization.
//!
//! The upstream wraps everything in an envelope whose `status` field can
//! signal failure even on HTTP 200, with `code`/`message` describing the
//! error. Raw article records are normalized into the display [`Article`]
//! form here: entries with blank or sentinel-removed titles are dropped,
//! order is preserved, and nothing is deduplicated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title the upstream substitutes when an article has been taken down.
pub const REMOVED_TITLE: &str = "[Removed]";

/// Shared shape of the upstream response envelopes.
pub trait Envelope {
    /// `"ok"` or `"error"`.
    fn status(&self) -> &str;
    fn error_code(&self) -> Option<&str>;
    fn error_message(&self) -> Option<&str>;

    fn is_ok(&self) -> bool {
        self.status() == "ok"
    }
}

/// Envelope returned by top-headlines and everything.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesEnvelope {
    #[serde(default)]
    pub status: String,

    /// Present on errors.
    #[serde(default)]
    pub code: Option<String>,

    /// Present on errors.
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default, rename = "totalResults")]
    pub total_results: u32,

    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

impl Envelope for ArticlesEnvelope {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn error_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Envelope returned by the sources listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesEnvelope {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Envelope for SourcesEnvelope {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn error_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// An article record exactly as the upstream returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Option<String>,

    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Source stub embedded in an article record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// A display-ready article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub source_id: Option<String>,
    pub source_name: String,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        let (source_id, source_name) = match raw.source {
            Some(s) => (s.id, s.name),
            None => (None, None),
        };
        Self {
            source_id,
            source_name: source_name.unwrap_or_else(|| "Unknown Source".to_string()),
            author: raw.author,
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            url: raw.url.unwrap_or_default(),
            image_url: raw.url_to_image,
            published_at: raw.published_at,
            content: raw.content,
        }
    }
}

/// A news source from the sources listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Filter and map raw records into the display list.
///
/// Drops records with blank or `[Removed]` titles and keeps the remainder
/// in upstream order.
pub fn normalize_articles(raw: Vec<RawArticle>) -> Vec<Article> {
    raw.into_iter()
        .filter(|a| match a.title.as_deref() {
            Some(title) => !title.trim().is_empty() && title != REMOVED_TITLE,
            None => false,
        })
        .map(Article::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADLINES_FIXTURE: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": "bbc-news", "name": "BBC News"},
                "author": "BBC Staff",
                "title": "First headline",
                "description": "Something happened",
                "url": "https://bbc.co.uk/1",
                "urlToImage": "https://bbc.co.uk/1.jpg",
                "publishedAt": "2024-03-01T12:00:00Z",
                "content": "Body text"
            },
            {
                "source": {"id": null, "name": null},
                "author": null,
                "title": "[Removed]",
                "description": null,
                "url": "https://removed.com",
                "urlToImage": null,
                "publishedAt": null,
                "content": null
            },
            {
                "source": null,
                "title": "Third headline",
                "url": "https://example.com/3"
            }
        ]
    }"#;

    const ERROR_FIXTURE: &str = r#"{
        "status": "error",
        "code": "apiKeyInvalid",
        "message": "Your API key is invalid or incorrect."
    }"#;

    #[test]
    fn test_deserialize_headlines_envelope() {
        let envelope: ArticlesEnvelope = serde_json::from_str(HEADLINES_FIXTURE).unwrap();
        assert!(envelope.is_ok());
        assert_eq!(envelope.total_results, 3);
        assert_eq!(envelope.articles.len(), 3);
        assert_eq!(envelope.articles[0].source.as_ref().unwrap().id.as_deref(), Some("bbc-news"));
    }

    #[test]
    fn test_deserialize_error_envelope() {
        let envelope: ArticlesEnvelope = serde_json::from_str(ERROR_FIXTURE).unwrap();
        assert!(!envelope.is_ok());
        assert_eq!(envelope.error_code(), Some("apiKeyInvalid"));
        assert!(envelope.error_message().unwrap().contains("invalid"));
        assert!(envelope.articles.is_empty());
    }

    #[test]
    fn test_normalize_drops_removed_and_keeps_order() {
        let envelope: ArticlesEnvelope = serde_json::from_str(HEADLINES_FIXTURE).unwrap();
        let articles = normalize_articles(envelope.articles);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "First headline");
        assert_eq!(articles[1].title, "Third headline");
    }

    #[test]
    fn test_normalize_drops_blank_titles() {
        let raw = vec![
            RawArticle { title: Some("  ".into()), ..Default::default() },
            RawArticle { title: None, ..Default::default() },
            RawArticle { title: Some("Kept".into()), ..Default::default() },
        ];
        let articles = normalize_articles(raw);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Kept");
    }

    #[test]
    fn test_missing_source_name_defaults() {
        let raw = vec![
            RawArticle { title: Some("No source".into()), source: None, ..Default::default() },
            RawArticle {
                title: Some("Null name".into()),
                source: Some(RawSource { id: Some("x".into()), name: None }),
                ..Default::default()
            },
        ];
        let articles = normalize_articles(raw);
        assert_eq!(articles[0].source_name, "Unknown Source");
        assert_eq!(articles[1].source_name, "Unknown Source");
        assert_eq!(articles[1].source_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_deserialize_sources_envelope() {
        let json = r#"{
            "status": "ok",
            "sources": [
                {
                    "id": "le-monde",
                    "name": "Le Monde",
                    "description": "Actualités en direct",
                    "url": "https://www.lemonde.fr",
                    "category": "general",
                    "language": "fr",
                    "country": "fr"
                }
            ]
        }"#;
        let envelope: SourcesEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.is_ok());
        assert_eq!(envelope.sources.len(), 1);
        assert_eq!(envelope.sources[0].id, "le-monde");
        assert_eq!(envelope.sources[0].language.as_deref(), Some("fr"));
    }
}
