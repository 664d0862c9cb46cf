//! Bounded retry with exponential backoff for transient platform failures.
//!
//! Each call moves through [`Attempt`]: it starts `Pending`, is `Attempting`
//! while a request is in flight, and ends `Succeeded` or `Failed`. A transient
//! error sends it back to `Attempting` until the attempt budget is spent; a
//! non-transient error fails it immediately.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::contextual::roster::api::ApiError;

/// Configuration for retry behaviour on transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay, including `Retry-After` hints.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Lifecycle of one retried call.
#[derive(Debug)]
pub enum Attempt<T> {
    Pending,
    Attempting(u32),
    Succeeded(T),
    Failed(ApiError),
}

impl RetryPolicy {
    /// Policy that never sleeps; used where waiting is pointless.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32, error: &ApiError) -> Duration {
        let backoff = match error {
            ApiError::RateLimited {
                retry_after_secs: Some(secs),
            } => Duration::from_secs(*secs),
            _ => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1))),
        };
        backoff.min(self.max_delay)
    }

    /// Runs `call` until it succeeds, fails permanently, or the attempt budget
    /// is exhausted.
    pub fn run<T>(&self, mut call: impl FnMut() -> Result<T, ApiError>) -> Result<T, ApiError> {
        let max_attempts = self.max_attempts.max(1);
        let mut state = Attempt::Pending;

        loop {
            state = match state {
                Attempt::Pending => Attempt::Attempting(1),
                Attempt::Attempting(attempt) => match call() {
                    Ok(value) => Attempt::Succeeded(value),
                    Err(error) if error.is_transient() && attempt < max_attempts => {
                        let delay = self.delay_for(attempt, &error);
                        warn!(attempt, ?delay, %error, "transient failure, retrying");
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                        Attempt::Attempting(attempt + 1)
                    }
                    Err(error) => Attempt::Failed(error),
                },
                Attempt::Succeeded(value) => return Ok(value),
                Attempt::Failed(error) => return Err(error),
            };
        }
    }
}
