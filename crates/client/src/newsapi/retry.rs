//! Retry backoff and circuit breaking for upstream calls.
//!
//! Transient failures (timeouts, transport errors, 429, 5xx) are retried a
//! bounded number of times with exponential backoff. Independently, a
//! breaker counts consecutive availability failures; once it trips, calls
//! fail fast until a cooldown elapses, after which a single probe is let
//! through.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, base_delay: Duration::from_secs(2) }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
///
/// Opens after `threshold` consecutive failures and stays open for
/// `cooldown`. After the cooldown the next call is allowed through as a
/// probe; its outcome decides whether the breaker closes or re-opens.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState { consecutive_failures: 0, opened_at: None }),
            threshold: threshold.max(1),
            cooldown,
        }
    }

    /// Ask permission to make a call. Returns the remaining cooldown when
    /// the breaker is open.
    pub async fn preflight(&self) -> Result<(), Duration> {
        let mut state = self.state.lock().await;
        if let Some(opened_at) = state.opened_at {
            let elapsed = opened_at.elapsed();
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
            // Cooldown over: allow one probe. One more failure re-opens,
            // one success closes.
            state.opened_at = None;
            state.consecutive_failures = self.threshold.saturating_sub(1);
            tracing::info!("circuit breaker half-open, probing upstream");
        }
        Ok(())
    }

    pub async fn record_success(&self) {
        let mut state = self.state.lock().await;
        if state.consecutive_failures > 0 {
            tracing::info!("circuit breaker closed after success");
        }
        state.consecutive_failures = 0;
        state.opened_at = None;
    }

    pub async fn record_failure(&self) {
        let mut state = self.state.lock().await;
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold && state.opened_at.is_none() {
            state.opened_at = Some(Instant::now());
            tracing::warn!(
                failures = state.consecutive_failures,
                cooldown_secs = self.cooldown.as_secs(),
                "circuit breaker opened"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy { max_retries: 3, base_delay: Duration::from_secs(2) };
        assert_eq!(policy.delay(0), Duration::from_secs(2));
        assert_eq!(policy.delay(1), Duration::from_secs(4));
        assert_eq!(policy.delay(2), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_breaker_stays_closed_below_threshold() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(breaker.preflight().await.is_ok());
    }

    #[tokio::test]
    async fn test_breaker_opens_at_threshold() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        for _ in 0..3 {
            breaker.record_failure().await;
        }
        assert!(breaker.preflight().await.is_err());
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_failure().await;
        breaker.record_failure().await;
        breaker.record_success().await;
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(breaker.preflight().await.is_ok());
    }

    #[tokio::test]
    async fn test_breaker_probes_after_cooldown() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(10));
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(breaker.preflight().await.is_err());

        tokio::time::sleep(Duration::from_millis(20)).await;

        // probe allowed
        assert!(breaker.preflight().await.is_ok());
        // probe failure re-opens immediately
        breaker.record_failure().await;
        assert!(breaker.preflight().await.is_err());
    }

    #[tokio::test]
    async fn test_probe_success_closes() {
        let breaker = CircuitBreaker::new(2, Duration::from_millis(10));
        breaker.record_failure().await;
        breaker.record_failure().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(breaker.preflight().await.is_ok());
        breaker.record_success().await;

        breaker.record_failure().await;
        assert!(breaker.preflight().await.is_ok());
    }
}
