//! Exponential backoff retry for the generation endpoint.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

/// Retries after the first attempt: 4 attempts in total.
pub const MAX_RETRIES: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 2;
const MAX_INTERVAL_SECS: u64 = 60;

/// Waits between attempts.
///
/// Implementations must only complete once the delay has elapsed. Dropping the
/// returned future cancels the wait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Backoff schedule of 2s, 4s, 8s with no jitter.
pub fn rate_limit_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        // The first delay comes from current_interval, not initial_interval.
        current_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Retry an async operation while its error is retryable.
///
/// `attempt` is called at most `MAX_RETRIES + 1` times, strictly one after
/// another. Before each retry the sleeper waits for the next backoff delay.
/// A non-retryable error is returned immediately; once retries run out the
/// last retryable error is returned.
pub async fn retry_with_backoff<T, E, Fut, F, R, S>(
    mut attempt: F,
    is_retryable: R,
    sleeper: &S,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    S: Sleeper + ?Sized,
{
    let mut backoff = rate_limit_backoff();
    let mut retries = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) && retries < MAX_RETRIES => {
                let delay = backoff
                    .next_backoff()
                    .unwrap_or(Duration::from_secs(MAX_INTERVAL_SECS));
                retries += 1;
                warn!(
                    "Rate limit hit. Retrying in {}s (retry {}/{})",
                    delay.as_secs(),
                    retries,
                    MAX_RETRIES
                );
                sleeper.sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
