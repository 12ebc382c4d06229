//! Exponential backoff around fallible async operations

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Up to `retries` extra attempts; attempt `n` waits `base * 2^n` first.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base: Duration,
}

impl RetryPolicy {
    pub const fn new(retries: u32) -> Self {
        Self {
            retries,
            base: Duration::from_secs(1),
        }
    }

    /// Delay before retry number `attempt` (1-based): 2s, 4s, 8s...
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base * 2u32.saturating_pow(attempt)
    }

    /// Run `op` until it succeeds, the error is not retryable, or retries
    /// run out. The last error is returned unchanged.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retries && should_retry(&err) => {
                    attempt += 1;
                    let delay = self.delay(attempt);
                    warn!(attempt, ?delay, error = %err, "retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
