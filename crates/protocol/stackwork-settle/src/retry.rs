//! Retry logic with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::{SettleError, SettleResult};

/// Retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay, config.max_delay)
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before attempt `attempt` (0-indexed): `base * 2^(attempt-1)`,
    /// capped at `max_delay`, with ±25% jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let multiplier = 2u32.saturating_pow(attempt - 1);
        let capped = std::cmp::min(self.base_delay.saturating_mul(multiplier), self.max_delay);

        let capped_ms = capped.as_millis() as u64;
        let jitter_range = capped_ms / 4;
        if jitter_range == 0 {
            return capped;
        }
        let jitter = rand::random::<u64>() % (jitter_range * 2);
        Duration::from_millis(
            capped_ms
                .saturating_sub(jitter_range)
                .saturating_add(jitter),
        )
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts are used up.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> SettleResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SettleResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            let delay = self.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(attempt, ?delay, "Retrying after delay");
                sleep(delay).await;
            }

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Retryable settlement error, will retry"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| SettleError::timeout("max retries exceeded")))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
