//! Retry policy for idempotent HTTP calls
//!
//! An explicit policy object passed into client construction, not ambient
//! global state. Applies to URL issuance and chunk GETs; writes (direct PUT,
//! proxy POST) are never retried - their recovery path is the direct→proxy
//! fallback, which is a path switch, not a retry.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Exponential backoff with jitter, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=250));
        (exp + jitter).min(self.max_delay)
    }

    /// Run `op`, retrying transient failures (connect/timeout/5xx) up to
    /// `max_attempts` times. Client errors (4xx) fail immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, reqwest::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt + 1 < self.max_attempts && is_transient(&err) => {
                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient network error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect()
        || err.is_timeout()
        || err.status().is_some_and(|status| status.is_server_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::default();
        let first = policy.backoff(0);
        let second = policy.backoff(1);

        assert!(first >= policy.base_delay);
        // Jitter is at most 250ms; doubling dominates it.
        assert!(second > first.saturating_sub(Duration::from_millis(250)));
        assert!(policy.backoff(20) <= policy.max_delay);
    }

    #[tokio::test]
    async fn test_run_returns_first_success() {
        let policy = RetryPolicy::with_max_attempts(3);
        let result: Result<u32, reqwest::Error> = policy.run(|| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
