//! Retry with exponential backoff for blocking store calls.
//!
//! Runs on a blocking thread. Retries stop at `max_retries` or when the next
//! backoff would end past `budget`, whichever comes first, so a retry loop
//! never outlives the search's per-query deadline by more than one attempt.

use std::time::{Duration, Instant};

use super::repo_config::PostgresConfig;
use super::repository::RepositoryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub budget: Duration,
}

impl RetryPolicy {
    /// A single attempt.
    pub fn never() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            budget: Duration::ZERO,
        }
    }

    /// Call `op` (with the zero-based attempt number) until it succeeds, fails
    /// with a non-retryable error, or the policy is exhausted. The last error
    /// is returned.
    pub fn run<T, F>(&self, mut op: F) -> RepositoryResult<T>
    where
        F: FnMut(u32) -> RepositoryResult<T>,
    {
        let started = Instant::now();
        let mut delay = self.initial_delay;
        let mut attempt = 0;

        loop {
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.max_retries {
                return Err(err);
            }
            if started.elapsed() + delay >= self.budget {
                log::debug!(
                    "retry budget of {:?} spent after {} attempt(s): {}",
                    self.budget,
                    attempt + 1,
                    err
                );
                return Err(err);
            }

            log::debug!("attempt {} failed, retrying in {:?}: {}", attempt + 1, delay, err);
            std::thread::sleep(delay);
            delay = delay.saturating_mul(2);
            attempt += 1;
        }
    }
}

impl From<&PostgresConfig> for RetryPolicy {
    fn from(config: &PostgresConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_delay_ms),
            budget: config.retry_budget(),
        }
    }
}
