//! Retry policy applied at the fetch boundary.
//!
//! Transient failures (429, network errors, 5xx) are retried with
//! exponential backoff. Everything else, including 404 and other 4xx
//! statuses, is returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// How many times to retry a transient failure and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay; the wait before retry `n` is `backoff_base_ms * 2^(n-1)`.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Delay before the retry following `attempt` failed attempts (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << attempt.min(62)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

/// Returns `true` if `err` is transient and worth another attempt.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation`, retrying transient errors according to `policy`.
///
/// With `max_retries = 3` the operation runs at most 4 times. When all
/// retries are exhausted the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) || attempt >= policy.max_retries {
            return Err(err);
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            attempt = attempt + 1,
            max_retries = policy.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient fetch error; retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
