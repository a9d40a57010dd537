//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (KIOSK_*)
//! 2. TOML config file (if KIOSK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (KIOSK_*)
/// 2. TOML config file (if KIOSK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// NewsAPI key, sent as the X-Api-Key header.
    ///
    /// Set via KIOSK_API_KEY environment variable. Required only when an
    /// upstream request is actually made.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the upstream news API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Address the web server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Article cache time-to-live in seconds. The sources listing is cached
    /// six times longer because it changes rarely.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Page size used when a route does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound on page size accepted from the query string.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of retries on transient upstream failures.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base delay for exponential backoff between retries, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Consecutive failures before the circuit breaker opens.
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: u32,

    /// How long an open circuit stays open before probing again, in seconds.
    #[serde(default = "default_breaker_cooldown_secs")]
    pub breaker_cooldown_secs: u64,

    /// Minimum normalized results for the direct country-headlines attempt
    /// to be trusted. Empirically chosen policy value, not a derived bound.
    #[serde(default = "default_tier1_min_results")]
    pub tier1_min_results: usize,

    /// Minimum normalized results for the curated-sources attempt to be
    /// trusted. The source lists are hand-vetted, so one hit is enough.
    #[serde(default = "default_tier2_min_results")]
    pub tier2_min_results: usize,
}

fn default_base_url() -> String {
    "https://newsapi.org/v2/".into()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_user_agent() -> String {
    "kiosk-web/0.1".into()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_page_size() -> u32 {
    12
}

fn default_max_page_size() -> u32 {
    100
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_breaker_threshold() -> u32 {
    5
}

fn default_breaker_cooldown_secs() -> u64 {
    30
}

fn default_tier1_min_results() -> usize {
    3
}

fn default_tier2_min_results() -> usize {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            bind_addr: default_bind_addr(),
            user_agent: default_user_agent(),
            cache_ttl_secs: default_cache_ttl_secs(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            timeout_ms: default_timeout_ms(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            breaker_threshold: default_breaker_threshold(),
            breaker_cooldown_secs: default_breaker_cooldown_secs(),
            tier1_min_results: default_tier1_min_results(),
            tier2_min_results: default_tier2_min_results(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Article cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Sources cache TTL. Sources are near-static reference data.
    pub fn sources_cache_ttl(&self) -> Duration {
        self.cache_ttl() * 6
    }

    /// Base delay for retry backoff as Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Circuit-breaker cooldown as Duration.
    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `KIOSK_`
    /// 2. TOML file from `KIOSK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KIOSK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KIOSK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that an API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no key is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "api_key".into(),
            hint: "Set KIOSK_API_KEY environment variable".into(),
        })
    }
}
