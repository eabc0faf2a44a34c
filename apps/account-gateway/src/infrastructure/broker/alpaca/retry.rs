//! Exponential backoff for transport-failure retries.

use std::time::Duration;

use super::config::RetryConfig;

/// Exponential backoff calculator.
#[derive(Debug)]
pub(super) struct ExponentialBackoff {
    pub(super) attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    pub(super) const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    /// Record a failed attempt and return the delay before the next one,
    /// or `None` when attempts are exhausted.
    pub(super) fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff.min(self.max_backoff);
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}
