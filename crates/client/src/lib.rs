//! Client code for kiosk.
//!
//! This crate provides the NewsAPI HTTP client: typed requests and
//! responses, article normalization, the upstream error taxonomy, and the
//! retry/circuit-breaker wrapper around the wire calls.

pub mod newsapi;

pub use newsapi::{
    Article, ArticlesEnvelope, EverythingRequest, NewsApi, NewsApiClient, NewsApiConfig, NewsApiError, RawArticle,
    SortBy, Source, SourcesEnvelope, SourcesRequest, TopHeadlinesRequest, normalize_articles,
};
