//! Retry with exponential backoff and jitter.
//!
//! The delay after failed attempt `n` (1-based) is
//! `base_delay * 2^(n-1) + jitter(max_jitter)`. With the defaults (5 s base,
//! up to 1 s jitter, 3 attempts) a run waits roughly 5 s and then 10 s
//! before giving up. The jitter keeps retries from lining up with every
//! other client that failed at the same moment.

use crate::pacing::Pacer;
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Draws the random part of a delay, given the configured maximum.
pub type JitterFn = fn(Duration) -> Duration;

/// Uniform jitter in `[0, max]`.
pub fn random_jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    rand::thread_rng().gen_range(Duration::ZERO..=max)
}

/// No jitter at all; handy for deterministic tests.
pub fn no_jitter(_max: Duration) -> Duration {
    Duration::ZERO
}

#[derive(Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
    jitter: JitterFn,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_jitter", &self.max_jitter)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5), Duration::from_secs(1))
    }
}

/// The last error once a policy gives up.
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts made, including the one that produced `error`.
    pub attempts: u32,
    pub error: E,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_jitter,
            jitter: random_jitter,
        }
    }

    pub fn with_jitter(mut self, jitter: JitterFn) -> Self {
        self.jitter = jitter;
        self
    }

    /// Exponential part of the delay after failed attempt `n` (1-based).
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    /// Full delay after failed attempt `n`, jitter included.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.backoff(failed_attempt)
            .saturating_add((self.jitter)(self.max_jitter))
    }

    /// Run `op` until it succeeds, a non-retryable error occurs, or
    /// `max_attempts` is reached. `op` receives the 1-based attempt number.
    pub fn run<T, E: fmt::Display>(
        &self,
        pacer: &impl Pacer,
        mut op: impl FnMut(u32) -> Result<T, E>,
        is_retryable: impl Fn(&E) -> bool,
    ) -> Result<T, RetryFailure<E>> {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= self.max_attempts || !is_retryable(&error) => {
                    return Err(RetryFailure {
                        attempts: attempt,
                        error,
                    });
                }
                Err(error) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_ms = delay.as_millis() as u64,
                        error = %error,
                        "attempt failed; retrying"
                    );
                    pacer.pause(delay);
                    attempt += 1;
                }
            }
        }
    }
}
