//! Bounded retry for transient resource contention.

use std::time::Duration;
use tracing::debug;

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed {
        /// Delay between attempts.
        delay: Duration,
    },
    /// Delay grows as `base * factor^retry`, capped at `max`.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
        /// Multiplicative factor per retry.
        factor: f64,
        /// Upper bound on any single delay.
        max: Duration,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed {
            delay: Duration::from_secs(2),
        }
    }
}

impl Backoff {
    /// Delay to wait after the given failed attempt (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { base, factor, max } => {
                let scale = factor.powi(retry.min(i32::MAX as u32) as i32);
                let seconds = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                Duration::from_secs_f64(seconds.max(0.0))
            }
        }
    }
}

/// A fixed number of attempts with a backoff between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never less than one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
        }
    }

    /// Effective attempt count.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` until it succeeds, fails with an error `retryable` rejects,
    /// or the attempts are used up. The last error is returned in both
    /// failure cases, so callers classify it with the same predicate.
    pub async fn run<T, E, F, R>(&self, mut op: F, retryable: R) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        R: Fn(&E) -> bool,
    {
        let attempts = self.attempts();
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= attempts || !retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.backoff.delay(attempt - 1);
                    debug!(attempt, max_attempts = attempts, ?delay, "retrying after contention");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
