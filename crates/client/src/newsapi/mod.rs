//! NewsAPI client.
//!
//! Provides a client for the NewsAPI v2 REST contract with request
//! validation, retry/backoff, circuit breaking, and typed error mapping.
//!
//! ### Upstream contract
//!
//! - **Endpoints**: `top-headlines`, `everything`, `top-headlines/sources`
//!   under `https://newsapi.org/v2/`.
//! - **Authentication**: `X-Api-Key` header.
//! - **Envelope**: every response carries a `status` field; `"error"` plus
//!   a code/message can arrive with HTTP 200, so logical failure is checked
//!   separately from the HTTP status.
//! - **Resilience**: bounded exponential-backoff retries on transient
//!   failures; a consecutive-failure circuit breaker fails fast while the
//!   upstream looks down.
//!
//! Caching is deliberately absent here: it is the caller's responsibility.

pub mod error;
pub mod request;
pub mod response;
pub mod retry;

pub use error::NewsApiError;
pub use request::{EverythingRequest, SortBy, SourcesRequest, TopHeadlinesRequest};
pub use response::{
    Article, ArticlesEnvelope, Envelope, RawArticle, RawSource, Source, SourcesEnvelope, normalize_articles,
};
pub use retry::{CircuitBreaker, RetryPolicy};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;

use kiosk_core::AppConfig;

/// Default base URL for NewsAPI.
const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "kiosk-web/0.1";

/// NewsAPI client configuration.
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    /// API key sent as the X-Api-Key header.
    pub api_key: String,
    /// Base URL (default: https://newsapi.org/v2/).
    pub base_url: String,
    /// Request timeout (default: 15s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
    /// Retry behaviour on transient failures.
    pub retry: RetryPolicy,
    /// Consecutive failures before the breaker opens.
    pub breaker_threshold: u32,
    /// How long an open breaker waits before probing.
    pub breaker_cooldown: Duration,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            breaker_threshold: 5,
            breaker_cooldown: Duration::from_secs(30),
        }
    }
}

impl NewsApiConfig {
    /// Build a client configuration from the loaded application config.
    ///
    /// Fails with `InvalidApiKey` when no key is configured; the key is the
    /// one field that cannot be defaulted.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NewsApiError> {
        let api_key = config.require_api_key().map_err(|_| NewsApiError::InvalidApiKey)?.to_string();

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            retry: RetryPolicy { max_retries: config.retry_count, base_delay: config.retry_delay() },
            breaker_threshold: config.breaker_threshold,
            breaker_cooldown: config.breaker_cooldown(),
        })
    }
}

/// Seam between the news service and the wire. The production
/// implementation is [`NewsApiClient`]; tests substitute stubs.
#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn top_headlines(&self, req: &TopHeadlinesRequest) -> Result<ArticlesEnvelope, NewsApiError>;

    async fn everything(&self, req: &EverythingRequest) -> Result<ArticlesEnvelope, NewsApiError>;

    async fn sources(&self, req: &SourcesRequest) -> Result<SourcesEnvelope, NewsApiError>;
}

/// NewsAPI HTTP client.
#[derive(Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    config: NewsApiConfig,
    breaker: Arc<CircuitBreaker>,
}

/// Minimal error body shape, parsed best-effort from non-success responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl NewsApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NewsApiConfig) -> Result<Self, NewsApiError> {
        if config.api_key.is_empty() {
            return Err(NewsApiError::InvalidApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NewsApiError::Unreachable(e.to_string()))?;

        let breaker = Arc::new(CircuitBreaker::new(config.breaker_threshold, config.breaker_cooldown));

        Ok(Self { http, config, breaker })
    }

    /// Create a client from the loaded application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NewsApiError> {
        Self::new(NewsApiConfig::from_app_config(config)?)
    }

    /// Issue one request with retries and breaker accounting.
    async fn fetch<T>(&self, path: &str, query: &(impl serde::Serialize + Sync)) -> Result<T, NewsApiError>
    where
        T: serde::de::DeserializeOwned + Envelope,
    {
        if let Err(remaining) = self.breaker.preflight().await {
            tracing::warn!(path, remaining_secs = remaining.as_secs(), "request rejected, circuit open");
            return Err(NewsApiError::Unreachable(format!(
                "circuit open for another {}s",
                remaining.as_secs().max(1)
            )));
        }

        let mut attempt = 0;
        loop {
            match self.send_once(path, query).await {
                Ok(envelope) => {
                    self.breaker.record_success().await;
                    return Ok(envelope);
                }
                Err(err) => {
                    if err.is_availability_failure() {
                        self.breaker.record_failure().await;
                    } else {
                        // The upstream answered; it is available even when
                        // it says no.
                        self.breaker.record_success().await;
                    }

                    if err.is_transient() && attempt < self.config.retry.max_retries {
                        let delay = self.config.retry.delay(attempt);
                        tracing::warn!(
                            path,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "transient upstream failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(err);
                }
            }
        }
    }

    async fn send_once<T>(&self, path: &str, query: &impl serde::Serialize) -> Result<T, NewsApiError>
    where
        T: serde::de::DeserializeOwned + Envelope,
    {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::debug!(%url, "news API request");

        let response = self
            .http
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .header("Accept", "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(query)
            .send()
            .await
            .map_err(NewsApiError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(NewsApiError::from)?;

        if !status.is_success() {
            let err_body: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            tracing::warn!(status = status.as_u16(), message = ?err_body.message, "news API error status");
            return Err(map_http_status(status.as_u16(), err_body.code, err_body.message));
        }

        let envelope: T = serde_json::from_str(&body).map_err(|e| NewsApiError::BadResponse(e.to_string()))?;

        // HTTP 200 does not guarantee logical success.
        if !envelope.is_ok() {
            return Err(map_api_code(envelope.error_code(), envelope.error_message()));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl NewsApi for NewsApiClient {
    async fn top_headlines(&self, req: &TopHeadlinesRequest) -> Result<ArticlesEnvelope, NewsApiError> {
        req.validate()?;
        self.fetch("top-headlines", req).await
    }

    async fn everything(&self, req: &EverythingRequest) -> Result<ArticlesEnvelope, NewsApiError> {
        req.validate()?;
        self.fetch("everything", req).await
    }

    async fn sources(&self, req: &SourcesRequest) -> Result<SourcesEnvelope, NewsApiError> {
        self.fetch("top-headlines/sources", req).await
    }
}

/// Map a non-success HTTP status (plus whatever the error body carried)
/// into the error taxonomy.
fn map_http_status(status: u16, code: Option<String>, message: Option<String>) -> NewsApiError {
    match status {
        401 => NewsApiError::InvalidApiKey,
        429 => NewsApiError::RateLimited,
        _ => NewsApiError::Upstream {
            status: Some(status),
            code,
            message: message.unwrap_or_else(|| "unknown API error".to_string()),
        },
    }
}

/// Map a logically-failed envelope (HTTP 200, `status: "error"`) into the
/// error taxonomy based on the embedded code.
fn map_api_code(code: Option<&str>, message: Option<&str>) -> NewsApiError {
    match code {
        Some("apiKeyInvalid") | Some("apiKeyMissing") | Some("apiKeyDisabled") => NewsApiError::InvalidApiKey,
        Some("rateLimited") => NewsApiError::RateLimited,
        _ => NewsApiError::Upstream {
            status: None,
            code: code.map(str::to_string),
            message: message.unwrap_or("news API reported an error").to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new_missing_key() {
        let config = NewsApiConfig::default();
        let result = NewsApiClient::new(config);
        assert!(matches!(result, Err(NewsApiError::InvalidApiKey)));
    }

    #[test]
    fn test_from_app_config_missing_key() {
        let config = AppConfig::default();
        let result = NewsApiConfig::from_app_config(&config);
        assert!(matches!(result, Err(NewsApiError::InvalidApiKey)));
    }

    #[test]
    fn test_from_app_config_carries_settings() {
        let app = AppConfig {
            api_key: Some("k".into()),
            retry_count: 5,
            retry_delay_ms: 100,
            breaker_threshold: 2,
            ..Default::default()
        };
        let config = NewsApiConfig::from_app_config(&app).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(100));
        assert_eq!(config.breaker_threshold, 2);
    }

    #[test]
    fn test_map_http_status() {
        assert!(matches!(map_http_status(401, None, None), NewsApiError::InvalidApiKey));
        assert!(matches!(map_http_status(429, None, None), NewsApiError::RateLimited));

        let err = map_http_status(503, Some("serverError".into()), Some("down".into()));
        match err {
            NewsApiError::Upstream { status, code, message } => {
                assert_eq!(status, Some(503));
                assert_eq!(code.as_deref(), Some("serverError"));
                assert_eq!(message, "down");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_map_api_code() {
        assert!(matches!(map_api_code(Some("apiKeyInvalid"), None), NewsApiError::InvalidApiKey));
        assert!(matches!(map_api_code(Some("apiKeyMissing"), None), NewsApiError::InvalidApiKey));
        assert!(matches!(map_api_code(Some("rateLimited"), None), NewsApiError::RateLimited));

        let err = map_api_code(Some("parametersMissing"), Some("q is required"));
        match err {
            NewsApiError::Upstream { status, code, message } => {
                assert_eq!(status, None);
                assert_eq!(code.as_deref(), Some("parametersMissing"));
                assert_eq!(message, "q is required");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_map_unknown_code_keeps_default_message() {
        let err = map_api_code(None, None);
        match err {
            NewsApiError::Upstream { message, .. } => assert_eq!(message, "news API reported an error"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
