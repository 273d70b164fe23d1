use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{BackoffStrategy, RetryPolicyConfig};

/// Every attempt of an operation failed
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {attempts} attempts: {last_error}")]
pub struct RetryError<E> {
    pub operation: String,
    pub attempts: u32,
    pub last_error: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    strategy: BackoffStrategy,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, strategy: BackoffStrategy, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            strategy,
            base_delay,
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(max_attempts, BackoffStrategy::Exponential, base_delay)
    }

    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(max_attempts, BackoffStrategy::Linear, base_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Sleep before attempt `failed_attempt + 1`, where `failed_attempt` is 1-based
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let step = failed_attempt.max(1);
        match self.strategy {
            BackoffStrategy::Exponential => {
                let factor = 1u32.checked_shl(step - 1).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
            BackoffStrategy::Linear => self.base_delay.saturating_mul(step),
        }
    }

    /// Run `operation` until it succeeds or attempts run out.
    ///
    /// The closure receives the 0-based attempt number. No sleep follows the
    /// final failed attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        mut f: F,
    ) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match f(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation = %operation, attempts = attempt + 1, "🔁 RETRY: Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(RetryError {
                            operation: operation.to_string(),
                            attempts: attempt,
                            last_error: error,
                        });
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = %operation,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "🔁 RETRY: Attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl From<&RetryPolicyConfig> for RetryPolicy {
    fn from(config: &RetryPolicyConfig) -> Self {
        RetryPolicy::new(
            config.max_attempts,
            config.strategy,
            Duration::from_millis(config.base_delay_ms),
        )
    }
}
