//! NewsAPI client error types.

/// Errors from the NewsAPI client.
///
/// HTTP status mapping: 401 becomes `InvalidApiKey`, 429 becomes
/// `RateLimited`, any other non-success status becomes `Upstream`. A 200
/// whose envelope carries `status: "error"` maps through the same taxonomy
/// based on the embedded error code.
#[derive(Debug, thiserror::Error)]
pub enum NewsApiError {
    /// API key missing, rejected, or expired.
    #[error("news API key is missing or invalid")]
    InvalidApiKey,

    /// Upstream rate limit exceeded.
    #[error("news API rate limit exceeded")]
    RateLimited,

    /// Any other upstream-reported error. `status` is absent when the error
    /// came from a logically-failed 200 response.
    #[error("news API error{}: {message}", status.map(|s| format!(" {s}")).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    /// The request timed out.
    #[error("request to the news API timed out")]
    Timeout,

    /// Transport-level failure before a response was received. Also raised
    /// without a network call while the circuit breaker is open.
    #[error("could not reach the news API: {0}")]
    Unreachable(String),

    /// The response body could not be deserialized. Never silently treated
    /// as an empty result.
    #[error("bad response from the news API: {0}")]
    BadResponse(String),

    /// The request failed local validation and was never sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl NewsApiError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            NewsApiError::Timeout | NewsApiError::Unreachable(_) | NewsApiError::RateLimited => true,
            NewsApiError::Upstream { status: Some(s), .. } => *s >= 500,
            _ => false,
        }
    }

    /// Whether the failure counts against the circuit breaker. Logical
    /// errors like a bad key say nothing about upstream availability.
    pub fn is_availability_failure(&self) -> bool {
        match self {
            NewsApiError::Timeout | NewsApiError::Unreachable(_) => true,
            NewsApiError::Upstream { status: Some(s), .. } => *s >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for NewsApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NewsApiError::Timeout } else { NewsApiError::Unreachable(err.to_string()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NewsApiError::Upstream { status: Some(500), code: None, message: "boom".into() };
        assert_eq!(err.to_string(), "news API error 500: boom");

        let err = NewsApiError::Upstream { status: None, code: Some("unexpectedError".into()), message: "boom".into() };
        assert_eq!(err.to_string(), "news API error: boom");

        assert!(NewsApiError::InvalidApiKey.to_string().contains("API key"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(NewsApiError::Timeout.is_transient());
        assert!(NewsApiError::Unreachable("dns".into()).is_transient());
        assert!(NewsApiError::RateLimited.is_transient());
        assert!(NewsApiError::Upstream { status: Some(503), code: None, message: String::new() }.is_transient());
        assert!(!NewsApiError::Upstream { status: Some(400), code: None, message: String::new() }.is_transient());
        assert!(!NewsApiError::InvalidApiKey.is_transient());
        assert!(!NewsApiError::BadResponse("garbage".into()).is_transient());
    }

    #[test]
    fn test_availability_classification() {
        assert!(NewsApiError::Timeout.is_availability_failure());
        assert!(NewsApiError::Upstream { status: Some(502), code: None, message: String::new() }.is_availability_failure());
        // rate limiting is the upstream working as intended
        assert!(!NewsApiError::RateLimited.is_availability_failure());
        assert!(!NewsApiError::InvalidApiKey.is_availability_failure());
    }
}
