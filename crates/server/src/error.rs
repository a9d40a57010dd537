//! User-facing error mapping for the page routes.
//!
//! Upstream failures become a status code plus copy suitable for an error
//! page; internals (codes, raw messages) stay in the logs.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use kiosk_client::NewsApiError;

use crate::views;

/// A failure rendered as an error page.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub title: &'static str,
    pub message: String,
}

impl PageError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, title: "Invalid request", message: message.into() }
    }
}

impl From<NewsApiError> for PageError {
    fn from(err: NewsApiError) -> Self {
        tracing::error!(error = %err, "news request failed");
        match err {
            NewsApiError::InvalidApiKey => Self {
                status: StatusCode::UNAUTHORIZED,
                title: "Configuration problem",
                message: "The news service is not configured correctly. Please try again later.".into(),
            },
            NewsApiError::RateLimited => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                title: "Too many requests",
                message: "We are fetching news a little too eagerly. Please try again in a minute.".into(),
            },
            NewsApiError::Upstream { status, .. } => Self {
                status: status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                title: "News provider error",
                message: "The news provider returned an error. Please try again later.".into(),
            },
            NewsApiError::Timeout => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                title: "Request timed out",
                message: "The news provider is taking too long to respond. Please try again.".into(),
            },
            NewsApiError::Unreachable(_) | NewsApiError::BadResponse(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                title: "News provider unavailable",
                message: "We could not reach the news provider. Please try again later.".into(),
            },
            NewsApiError::InvalidRequest(reason) => Self::bad_request(reason),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = views::error_page(self.status.as_u16(), self.title, &self.message);
        (self.status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_maps_to_unauthorized() {
        let err = PageError::from(NewsApiError::InvalidApiKey);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rate_limit_maps_to_429() {
        let err = PageError::from(NewsApiError::RateLimited);
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let err = PageError::from(NewsApiError::Upstream {
            status: Some(503),
            code: None,
            message: "down".into(),
        });
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_upstream_without_status_is_bad_gateway() {
        let err = PageError::from(NewsApiError::Upstream { status: None, code: None, message: "odd".into() });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = PageError::from(NewsApiError::Timeout);
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_invalid_request_keeps_reason() {
        let err = PageError::from(NewsApiError::InvalidRequest("page must be at least 1".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("page"));
    }
}
