//! Retry logic for transiently failing operations
//!
//! Instrumented test processes can still hold a lock on the report file
//! while we try to write it, so writes go through [`retry`].

use std::fmt::Display;
use std::time::Duration;

/// Retry configuration for an operation
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub exponential_backoff: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 100,
            exponential_backoff: false,
        }
    }
}

impl RetryConfig {
    /// Delay producer: fixed, or doubling from `delay_ms`
    pub fn backoff(&self) -> impl FnMut() -> Duration {
        let mut next = self.delay_ms;
        let exponential = self.exponential_backoff;
        move || {
            let delay = Duration::from_millis(next);
            if exponential {
                next = next.saturating_mul(2);
            }
            delay
        }
    }

    pub fn run<T, E, F>(&self, action: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        retry(action, self.backoff(), self.max_attempts)
    }
}

/// Call `action` until it succeeds, at most `max_attempts` times
///
/// `backoff` is asked for a delay after every failed attempt that is
/// followed by another one; the first attempt never waits. Once the budget
/// is spent the last error is returned as is.
pub fn retry<T, E, F, B>(mut action: F, mut backoff: B, max_attempts: u32) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    B: FnMut() -> Duration,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match action() {
            Ok(value) => {
                if attempts > 1 {
                    tracing::debug!(attempts, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempts >= max_attempts => return Err(err),
            Err(err) => {
                let delay = backoff();
                tracing::warn!(
                    attempt = attempts,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, retrying"
                );
                std::thread::sleep(delay);
            }
        }
    }
}
