//! Country-scoped headlines with a three-tier fallback chain.
//!
//! The upstream's direct country filter has uneven coverage, so a single
//! attempt is not enough:
//!
//! 1. top-headlines with `country` + `category`; trusted only when it
//!    returns at least `tier1_min_results` normalized articles, because a
//!    thin result set from this filter is often low-relevance or
//!    wrong-country noise.
//! 2. top-headlines filtered by the curated source list for the country
//!    (category omitted; the upstream forbids mixing the two). The lists
//!    are hand-vetted, so `tier2_min_results` (one hit) is trusted.
//!    Skipped entirely for unmapped countries.
//! 3. everything-search for "<category keyword> <country name>" in the
//!    country's dominant language, newest first. Always accepted, even
//!    empty: a page of loosely relevant articles beats an empty page.
//!
//! Failures in attempts 1 and 2 are logged and fall through; a failure in
//! attempt 3 becomes an empty result labeled `failed` rather than an error.
//! Each attempt has its own cache slot; a hit short-circuits the rest.

use std::fmt;

use serde::{Deserialize, Serialize};

use kiosk_client::newsapi::{EverythingRequest, SortBy, TopHeadlinesRequest, normalize_articles};
use kiosk_core::cache::key;
use kiosk_core::catalog;

use super::{HeadlinePage, NewsService};

/// Which attempt produced a headline result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    TopHeadlines,
    Sources,
    Search,
    Failed,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::TopHeadlines => "top-headlines",
            Strategy::Sources => "sources",
            Strategy::Search => "search",
            Strategy::Failed => "failed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the fallback chain. Never an error: the worst case is an
/// empty page labeled `failed`.
#[derive(Debug, Clone)]
pub struct HeadlinesResult {
    pub articles: Vec<kiosk_client::newsapi::Article>,
    pub total_results: u32,
    pub from_cache: bool,
    pub strategy: Strategy,
}

impl HeadlinesResult {
    fn cached(page: HeadlinePage) -> Self {
        Self { articles: page.articles, total_results: page.total_results, from_cache: true, strategy: page.strategy }
    }

    fn fresh(page: HeadlinePage) -> Self {
        Self { articles: page.articles, total_results: page.total_results, from_cache: false, strategy: page.strategy }
    }
}

impl NewsService {
    /// Country-scoped headlines via the three-tier fallback chain.
    pub async fn headlines_by_country(
        &self, country: &str, category: &str, page: u32, page_size: u32,
    ) -> HeadlinesResult {
        let country = country.trim().to_lowercase();
        let category = category.trim().to_lowercase();
        let policy = self.policy();

        // Attempt 1: direct country + category filter.
        let key1 = key::headlines(Strategy::TopHeadlines.as_str(), &country, &category, page, page_size);
        if let Some(hit) = self.headline_cache().get(&key1).await {
            return HeadlinesResult::cached(hit);
        }

        match self.try_country_filter(&country, &category, page, page_size).await {
            Ok(result) if result.articles.len() >= policy.tier1_min_results => {
                self.headline_cache().put(key1, result.clone()).await;
                return HeadlinesResult::fresh(result);
            }
            Ok(result) => {
                tracing::info!(
                    country,
                    count = result.articles.len(),
                    "country filter returned too few results, trying curated sources"
                );
            }
            Err(err) => {
                tracing::warn!(country, error = %err, "country filter attempt failed");
            }
        }

        // Attempt 2: curated per-country source list, when one exists.
        if let Some(source_list) = catalog::sources_for_country(&country) {
            let key2 = key::headlines(Strategy::Sources.as_str(), &country, &category, page, page_size);
            if let Some(hit) = self.headline_cache().get(&key2).await {
                return HeadlinesResult::cached(hit);
            }

            match self.try_curated_sources(&source_list, page, page_size).await {
                Ok(result) if result.articles.len() >= policy.tier2_min_results => {
                    self.headline_cache().put(key2, result.clone()).await;
                    return HeadlinesResult::fresh(result);
                }
                Ok(result) => {
                    tracing::info!(country, count = result.articles.len(), "curated sources returned nothing usable");
                }
                Err(err) => {
                    tracing::warn!(country, error = %err, "curated sources attempt failed");
                }
            }
        }

        // Attempt 3: broad keyword search. Catch-all; accepts anything.
        let key3 = key::headlines(Strategy::Search.as_str(), &country, &category, page, page_size);
        if let Some(hit) = self.headline_cache().get(&key3).await {
            return HeadlinesResult::cached(hit);
        }

        match self.try_keyword_search(&country, &category, page, page_size).await {
            Ok(result) => {
                self.headline_cache().put(key3, result.clone()).await;
                HeadlinesResult::fresh(result)
            }
            Err(err) => {
                tracing::error!(country, error = %err, "keyword search attempt failed, nothing left to try");
                HeadlinesResult {
                    articles: Vec::new(),
                    total_results: 0,
                    from_cache: false,
                    strategy: Strategy::Failed,
                }
            }
        }
    }

    async fn try_country_filter(
        &self, country: &str, category: &str, page: u32, page_size: u32,
    ) -> Result<HeadlinePage, kiosk_client::NewsApiError> {
        let req = TopHeadlinesRequest {
            country: Some(country.to_string()),
            category: Some(category.to_string()),
            page,
            page_size,
            ..Default::default()
        };

        tracing::info!(country, category, "headlines attempt: country filter");
        let envelope = self.client().top_headlines(&req).await?;
        Ok(HeadlinePage {
            articles: normalize_articles(envelope.articles),
            total_results: envelope.total_results,
            strategy: Strategy::TopHeadlines,
        })
    }

    async fn try_curated_sources(
        &self, source_list: &str, page: u32, page_size: u32,
    ) -> Result<HeadlinePage, kiosk_client::NewsApiError> {
        let req = TopHeadlinesRequest {
            sources: Some(source_list.to_string()),
            page,
            page_size,
            ..Default::default()
        };

        tracing::info!(sources = %truncate(source_list, 40), "headlines attempt: curated sources");
        let envelope = self.client().top_headlines(&req).await?;
        Ok(HeadlinePage {
            articles: normalize_articles(envelope.articles),
            total_results: envelope.total_results,
            strategy: Strategy::Sources,
        })
    }

    async fn try_keyword_search(
        &self, country: &str, category: &str, page: u32, page_size: u32,
    ) -> Result<HeadlinePage, kiosk_client::NewsApiError> {
        let country_name = catalog::country_display_name(country);
        let language = catalog::language_for_country(country);
        let keyword = if category == "general" { "news" } else { category };
        let query = format!("{keyword} {country_name}");

        tracing::info!(%query, language, "headlines attempt: keyword search");
        let req = EverythingRequest {
            q: query,
            language: Some(language.to_string()),
            sort_by: Some(SortBy::PublishedAt),
            page,
            page_size,
            ..Default::default()
        };

        let envelope = self.client().everything(&req).await?;
        Ok(HeadlinePage {
            articles: normalize_articles(envelope.articles),
            total_results: envelope.total_results,
            strategy: Strategy::Search,
        })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    &s[..s.len().min(max)]
}
