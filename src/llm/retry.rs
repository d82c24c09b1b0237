//! Bounded retry with exponential backoff for completion calls.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

/// Default pause before the retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_INTERVAL_SECS: u64 = 30;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
}

impl RetryPolicy {
    /// One attempt plus exactly one retry after `delay`.
    pub fn single_retry(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            initial_interval: delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_retry(DEFAULT_RETRY_DELAY)
    }
}

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `policy.max_attempts` times. An error for which
/// `should_retry` is false is returned immediately; otherwise the task
/// sleeps before the next attempt. After the last attempt the last error is
/// returned unchanged.
pub async fn retry_with_backoff<T, E, Fut, F, P>(
    policy: RetryPolicy,
    mut attempt: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut backoff = ExponentialBackoff {
        current_interval: policy.initial_interval,
        initial_interval: policy.initial_interval,
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS).max(policy.initial_interval),
        randomization_factor: 0.0,
        max_elapsed_time: None,
        ..Default::default()
    };

    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempts >= max_attempts || !should_retry(&e) {
                    return Err(e);
                }

                let wait = backoff.next_backoff().unwrap_or(policy.initial_interval);
                warn!(attempt = attempts, error = %e, "retrying in {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
    }
}
