//! News service: the layer between the page routes and the upstream
//! client. Owns the caches and applies the cache-key discipline; the
//! country-headlines fallback chain lives in [`headlines`].

mod headlines;

pub use headlines::{HeadlinesResult, Strategy};

use std::sync::Arc;

use kiosk_client::newsapi::{
    Article, EverythingRequest, NewsApi, NewsApiError, SortBy, Source, SourcesRequest, TopHeadlinesRequest,
    normalize_articles,
};
use kiosk_core::cache::key;
use kiosk_core::{AppConfig, MemoryCache};

/// A normalized page of articles, as stored in the cache.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total_results: u32,
}

/// A cached fallback outcome: an article page plus the strategy that
/// produced it.
#[derive(Debug, Clone)]
pub struct HeadlinePage {
    pub articles: Vec<Article>,
    pub total_results: u32,
    pub strategy: Strategy,
}

/// Search results handed to the views.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub articles: Vec<Article>,
    pub total_results: u32,
    pub from_cache: bool,
}

/// Sources listing handed to the views.
#[derive(Debug, Clone)]
pub struct SourcesResult {
    pub sources: Vec<Source>,
    pub from_cache: bool,
}

/// Input bundle for the headline listing. Pure value object.
#[derive(Debug, Clone)]
pub struct HeadlinesQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    /// Comma-separated source ids; mutually exclusive with
    /// country/category upstream, resolved here by dropping the latter.
    pub sources: Option<String>,
    pub query: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for HeadlinesQuery {
    fn default() -> Self {
        Self { country: None, category: None, sources: None, query: None, page: 1, page_size: 12 }
    }
}

/// Input bundle for full-text search. Pure value object.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub sources: Option<String>,
    pub language: Option<String>,
    pub sort_by: SortBy,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            sources: None,
            language: None,
            sort_by: SortBy::PublishedAt,
            from: None,
            to: None,
            page: 1,
            page_size: 12,
        }
    }
}

/// Optional filters for the sources listing.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    pub category: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

/// Fallback acceptance thresholds; policy values, see config.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FallbackPolicy {
    pub tier1_min_results: usize,
    pub tier2_min_results: usize,
}

/// The news service. Cheap to clone is not needed; handlers share it via
/// `Arc` in the application state.
pub struct NewsService {
    client: Arc<dyn NewsApi>,
    articles: MemoryCache<ArticlePage>,
    headlines: MemoryCache<HeadlinePage>,
    sources: MemoryCache<Vec<Source>>,
    policy: FallbackPolicy,
}

impl NewsService {
    pub fn new(client: Arc<dyn NewsApi>, config: &AppConfig) -> Self {
        Self {
            client,
            articles: MemoryCache::new(config.cache_ttl()),
            headlines: MemoryCache::new(config.cache_ttl()),
            sources: MemoryCache::new(config.sources_cache_ttl()),
            policy: FallbackPolicy {
                tier1_min_results: config.tier1_min_results,
                tier2_min_results: config.tier2_min_results,
            },
        }
    }

    pub(crate) fn client(&self) -> &dyn NewsApi {
        self.client.as_ref()
    }

    pub(crate) fn headline_cache(&self) -> &MemoryCache<HeadlinePage> {
        &self.headlines
    }

    pub(crate) fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Top headlines without the country fallback chain, for explicit
    /// source-filtered listings. The upstream cannot mix `sources` with
    /// `country`/`category`, so those are dropped when sources are given.
    pub async fn top_headlines(&self, q: &HeadlinesQuery) -> Result<SearchResults, NewsApiError> {
        let has_sources = q.sources.as_deref().is_some_and(|s| !s.trim().is_empty());
        let country = if has_sources { None } else { Some(q.country.clone().unwrap_or_else(|| "us".into())) };
        let category = if has_sources { None } else { Some(q.category.clone().unwrap_or_else(|| "general".into())) };

        let cache_key = key::top_headlines(
            country.as_deref(),
            category.as_deref(),
            q.sources.as_deref(),
            q.query.as_deref(),
            q.page,
            q.page_size,
        );

        if let Some(page) = self.articles.get(&cache_key).await {
            tracing::debug!(key = %cache_key, "cache hit");
            return Ok(SearchResults { articles: page.articles, total_results: page.total_results, from_cache: true });
        }

        let req = TopHeadlinesRequest {
            country,
            category,
            sources: if has_sources { q.sources.clone() } else { None },
            q: q.query.clone(),
            page: q.page,
            page_size: q.page_size,
        };

        let envelope = self.client.top_headlines(&req).await?;
        let articles = normalize_articles(envelope.articles);
        let page = ArticlePage { articles, total_results: envelope.total_results };

        self.articles.put(cache_key, page.clone()).await;

        Ok(SearchResults { articles: page.articles, total_results: page.total_results, from_cache: false })
    }

    /// Full-text search. An empty query short-circuits to an empty result
    /// without touching the upstream.
    pub async fn search(&self, q: &SearchQuery) -> Result<SearchResults, NewsApiError> {
        if q.query.trim().is_empty() {
            return Ok(SearchResults { articles: Vec::new(), total_results: 0, from_cache: false });
        }

        let cache_key = key::everything(
            &q.query,
            q.sources.as_deref(),
            q.language.as_deref(),
            Some(q.sort_by.as_str()),
            q.from.as_deref(),
            q.to.as_deref(),
            q.page,
            q.page_size,
        );

        if let Some(page) = self.articles.get(&cache_key).await {
            tracing::debug!(key = %cache_key, "cache hit");
            return Ok(SearchResults { articles: page.articles, total_results: page.total_results, from_cache: true });
        }

        let req = EverythingRequest {
            q: q.query.clone(),
            sources: q.sources.clone(),
            language: q.language.clone(),
            sort_by: Some(q.sort_by),
            from: q.from.clone(),
            to: q.to.clone(),
            page: q.page,
            page_size: q.page_size,
        };

        let envelope = self.client.everything(&req).await?;
        let articles = normalize_articles(envelope.articles);
        let page = ArticlePage { articles, total_results: envelope.total_results };

        self.articles.put(cache_key, page.clone()).await;

        Ok(SearchResults { articles: page.articles, total_results: page.total_results, from_cache: false })
    }

    /// Sources listing. Cached longer than articles; the upstream's source
    /// catalogue changes rarely.
    pub async fn sources(&self, filter: &SourceFilter) -> Result<SourcesResult, NewsApiError> {
        let cache_key = key::sources(filter.category.as_deref(), filter.language.as_deref(), filter.country.as_deref());

        if let Some(sources) = self.sources.get(&cache_key).await {
            tracing::debug!(key = %cache_key, "cache hit");
            return Ok(SourcesResult { sources, from_cache: true });
        }

        let req = SourcesRequest {
            category: filter.category.clone(),
            language: filter.language.clone(),
            country: filter.country.clone(),
        };

        let envelope = self.client.sources(&req).await?;
        self.sources.put(cache_key, envelope.sources.clone()).await;

        Ok(SourcesResult { sources: envelope.sources, from_cache: false })
    }

    /// Articles related to a title: the first three words longer than
    /// three characters, ORed together, searched by relevancy. The article
    /// itself is excluded by exact (case-insensitive) title match.
    /// Failures degrade to an empty list.
    pub async fn related_articles(&self, title: &str, count: usize) -> Vec<Article> {
        let Some(query) = related_query(title) else {
            return Vec::new();
        };

        let q = SearchQuery {
            query,
            language: Some("en".into()),
            sort_by: SortBy::Relevancy,
            page: 1,
            page_size: (count + 1) as u32,
            ..Default::default()
        };

        match self.search(&q).await {
            Ok(results) => results
                .articles
                .into_iter()
                .filter(|a| !a.title.eq_ignore_ascii_case(title))
                .take(count)
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "could not fetch related articles");
                Vec::new()
            }
        }
    }
}

/// Keyword query for related-article lookup, or `None` when the title has
/// no usable words.
fn related_query(title: &str) -> Option<String> {
    let keywords: Vec<&str> = title.split_whitespace().filter(|w| w.len() > 3).take(3).collect();
    if keywords.is_empty() { None } else { Some(keywords.join(" OR ")) }
}
