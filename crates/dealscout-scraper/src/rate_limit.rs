//! Retry and backoff utilities for marketplace requests.
//!
//! Provides capped exponential backoff with jitter for transient HTTP
//! failures (5xx, 408, 429, timeouts, connection errors). Client errors,
//! configuration errors, and dropped listings are propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Bounded retry schedule for one marketplace request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure; `2` means at most three
    /// requests in total.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub backoff_base_secs: u64,
    /// Upper bound on any single delay, jitter included.
    pub backoff_max_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_secs: 4,
            backoff_max_secs: 10,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries; used by tests and one-shot probes.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_secs: 0,
            backoff_max_secs: 0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// `base * 2^(retry-1)` seconds, capped at `backoff_max_secs`, then
    /// scaled by a random factor in `[0.75, 1.25)` and clamped to the cap
    /// again.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let cap_ms = self.backoff_max_secs.saturating_mul(1_000);
        let computed_ms = self
            .backoff_base_secs
            .saturating_mul(1_000)
            .saturating_mul(1u64 << retry.saturating_sub(1).min(30));
        let capped_ms = computed_ms.min(cap_ms);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered_ms = (capped_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        Duration::from_millis(jittered_ms.min(cap_ms))
    }
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::HttpStatus`] with a 5xx, 408, or 429 status.
/// - [`ScraperError::Timeout`]: the per-request timeout elapsed.
/// - [`ScraperError::Network`]: connection refused/reset, DNS failure, or a
///   body that was cut off mid-read.
///
/// Everything else (other 4xx, bad configuration, dropped listings) is
/// returned to the caller on the first occurrence.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::HttpStatus { status, .. } => {
            *status >= 500 || *status == 408 || *status == 429
        }
        ScraperError::Timeout { .. } => true,
        ScraperError::Network { source, .. } => !source.is_builder() && !source.is_decode(),
        ScraperError::ClientBuild(_)
        | ScraperError::InvalidBaseUrl { .. }
        | ScraperError::InvalidHeader { .. }
        | ScraperError::Selector { .. }
        | ScraperError::Normalization { .. } => false,
    }
}

/// Executes `operation`, retrying transient failures according to `policy`.
///
/// With the default policy the operation runs at most three times, sleeping
/// roughly 4 s and then 8 s between attempts. When retries are exhausted the
/// last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || retry >= policy.max_retries {
                    return Err(err);
                }
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    attempt = retry,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient marketplace error; retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
