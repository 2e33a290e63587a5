//! Bounded retry for the first-page request

use crate::config::RetryConfig;
use crate::domain::{MeridianError, Result};
use crate::log_retry_attempt;
use std::future::Future;
use std::time::Duration;

/// How many times the first-page request is attempted
///
/// Every error is retried. Whether a failure is surfaced or turned into an
/// outcome is decided after the last attempt, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    wait: Duration,
}

impl RetryPolicy {
    /// Policy with `max_attempts` total attempts and no pause between them
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Validation`] when `max_attempts` is zero.
    pub fn new(max_attempts: usize) -> Result<Self> {
        if max_attempts == 0 {
            return Err(MeridianError::Validation(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            wait: Duration::ZERO,
        })
    }

    /// Sets the pause between attempts
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Runs `operation` until it succeeds or the attempts are used up
    ///
    /// The closure receives the 1-based attempt number. After the final
    /// attempt the last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }

                    log_retry_attempt!(
                        attempt,
                        self.max_attempts,
                        self.wait.as_millis() as u64,
                        e
                    );

                    if !self.wait.is_zero() {
                        tokio::time::sleep(self.wait).await;
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait: Duration::ZERO,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            wait: Duration::from_millis(config.wait_ms),
        }
    }
}
