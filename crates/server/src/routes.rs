//! HTTP routes and handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use kiosk_client::newsapi::{Article, SortBy};
use kiosk_core::AppConfig;

use crate::error::PageError;
use crate::news::{HeadlinesQuery, NewsService, SearchQuery, SourceFilter, Strategy};
use crate::views::{self, HeadlinesView, Pagination, SearchView, SourceFilterView};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
    pub config: Arc<AppConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(headlines))
        .route("/search", get(search))
        .route("/article", get(article_detail))
        .route("/sources", get(sources))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct HeadlinesParams {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    sources: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
}

/// GET / — top headlines. With an explicit `sources` filter the listing
/// goes straight to the upstream source filter; otherwise it runs the
/// country fallback chain.
async fn headlines(
    State(state): State<AppState>, Query(params): Query<HeadlinesParams>,
) -> Result<Html<String>, PageError> {
    let country = params.country.unwrap_or_else(|| "us".to_string());
    let category = params.category.unwrap_or_else(|| "general".to_string());
    let sources = params.sources.unwrap_or_default();
    let page = params.page.max(1);
    let page_size = state.config.default_page_size;

    let view_html = if sources.trim().is_empty() {
        let result = state.service.headlines_by_country(&country, &category, page, page_size).await;
        tracing::info!(
            country,
            category,
            strategy = %result.strategy,
            count = result.articles.len(),
            from_cache = result.from_cache,
            "headlines loaded"
        );
        views::headlines_page(&HeadlinesView {
            articles: &result.articles,
            pagination: Pagination { current_page: page, page_size, total_results: result.total_results },
            country: &country,
            category: &category,
            sources: "",
            strategy: result.strategy,
            from_cache: result.from_cache,
            error: None,
        })
    } else {
        let results = state
            .service
            .top_headlines(&HeadlinesQuery { sources: Some(sources.clone()), page, page_size, ..Default::default() })
            .await?;
        views::headlines_page(&HeadlinesView {
            articles: &results.articles,
            pagination: Pagination { current_page: page, page_size, total_results: results.total_results },
            country: &country,
            category: &category,
            sources: &sources,
            strategy: Strategy::TopHeadlines,
            from_cache: results.from_cache,
            error: None,
        })
    };

    Ok(Html(view_html))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default, rename = "sortBy")]
    sort_by: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
}

/// GET /search — full-text search with a source dropdown scoped to the
/// selected language. Search failures render inline rather than replacing
/// the page.
async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Html<String> {
    let query = params.q.unwrap_or_default();
    let sort_by = params.sort_by.unwrap_or_else(|| "publishedAt".to_string());
    let language = params.language.unwrap_or_else(|| "en".to_string());
    let source = params.source.unwrap_or_default();
    let from = params.from.unwrap_or_default();
    let to = params.to.unwrap_or_default();
    let page = params.page.max(1);
    let page_size = state.config.default_page_size;

    // dropdown contents; an empty list is fine if the upstream is down
    let dropdown = match state
        .service
        .sources(&SourceFilter { language: Some(language.clone()), ..Default::default() })
        .await
    {
        Ok(result) => result.sources,
        Err(err) => {
            tracing::warn!(error = %err, "could not load sources for search dropdown");
            Vec::new()
        }
    };

    let mut articles = Vec::new();
    let mut total_results = 0;
    let mut from_cache = false;
    let mut error = None;

    if !query.trim().is_empty() {
        let search_query = SearchQuery {
            query: query.clone(),
            sources: if source.is_empty() { None } else { Some(source.clone()) },
            language: Some(language.clone()),
            sort_by: SortBy::parse_or_default(&sort_by),
            from: if from.is_empty() { None } else { Some(from.clone()) },
            to: if to.is_empty() { None } else { Some(to.clone()) },
            page,
            page_size,
        };
        match state.service.search(&search_query).await {
            Ok(results) => {
                articles = results.articles;
                total_results = results.total_results;
                from_cache = results.from_cache;
            }
            Err(err) => {
                tracing::error!(error = %err, query, "search failed");
                error = Some("Search failed. Please try different keywords.");
            }
        }
    }

    Html(views::search_page(&SearchView {
        query: &query,
        sort_by: &sort_by,
        language: &language,
        source: &source,
        from: &from,
        to: &to,
        articles: &articles,
        pagination: Pagination { current_page: page, page_size, total_results },
        sources: &dropdown,
        from_cache,
        error,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ArticleParams {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

/// GET /article — detail page reconstructed from query parameters, plus a
/// related-articles strip. A missing url bounces back to the headlines.
async fn article_detail(
    State(state): State<AppState>, Query(params): Query<ArticleParams>,
) -> axum::response::Response {
    let url = params.url.unwrap_or_default();
    if url.trim().is_empty() {
        return Redirect::to("/").into_response();
    }

    let title = params.title.unwrap_or_default();
    let published_at = params
        .published_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let article = Article {
        source_id: None,
        source_name: params.source.unwrap_or_else(|| "Unknown".to_string()),
        author: params.author,
        title: title.clone(),
        description: params.description,
        url,
        image_url: params.image,
        published_at,
        content: None,
    };

    let related = state.service.related_articles(&title, 6).await;

    Html(views::detail_page(&article, &related)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct SourcesParams {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// GET /sources — browsable source directory with optional filters.
async fn sources(State(state): State<AppState>, Query(params): Query<SourcesParams>) -> Html<String> {
    let filter = SourceFilter {
        category: params.category.filter(|v| !v.is_empty()),
        language: params.language.filter(|v| !v.is_empty()),
        country: params.country.filter(|v| !v.is_empty()),
    };

    let (listing, error) = match state.service.sources(&filter).await {
        Ok(result) => (result.sources, None),
        Err(err) => {
            tracing::error!(error = %err, "could not load sources");
            (Vec::new(), Some("Could not load sources right now."))
        }
    };

    Html(views::sources_page(
        &listing,
        &SourceFilterView {
            category: filter.category.as_deref().unwrap_or(""),
            language: filter.language.as_deref().unwrap_or(""),
            country: filter.country.as_deref().unwrap_or(""),
        },
        error,
    ))
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> impl IntoResponse {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}
