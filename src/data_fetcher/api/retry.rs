//! Retry classification for a single HTTP attempt.
//!
//! `RetryPolicy::decide` is pure: it maps what happened on attempt `n` to
//! what the fetcher should do next, so backoff behaviour is testable
//! without a network or a clock.

use crate::constants::retry;
use std::time::Duration;

/// What a single attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The server answered with this status code.
    Status(u16),
    /// The attempt hit the per-attempt timeout.
    Timeout,
    /// DNS failure, refused or reset connection.
    Connection,
    /// Any other transport-level failure.
    Transport,
}

impl AttemptOutcome {
    /// Classifies a reqwest error.
    pub fn from_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            AttemptOutcome::Timeout
        } else if error.is_connect() {
            AttemptOutcome::Connection
        } else {
            AttemptOutcome::Transport
        }
    }
}

/// What the fetcher does after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the response to the caller.
    Succeed,
    /// Wait, then try again.
    RetryAfter(Duration),
    /// Stop and report "no result".
    GiveUp,
    /// Stop and surface an error.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            retry::MAX_ATTEMPTS,
            Duration::from_secs(retry::BACKOFF_UNIT_SECONDS),
        )
    }
}

impl RetryPolicy {
    /// `max_attempts` counts the first attempt; a value of 0 behaves like 1.
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    /// Decides the next step after attempt number `attempt` (1-based).
    ///
    /// | outcome                      | action                                |
    /// |------------------------------|---------------------------------------|
    /// | 200                          | succeed                               |
    /// | 404                          | give up at once                       |
    /// | 429, 503, other 5xx          | retry after `unit * attempt`          |
    /// | any other status             | fail                                  |
    /// | timeout, connection error    | retry after `unit`                    |
    /// | other transport error        | give up at once                       |
    ///
    /// Retries only happen while `attempt < max_attempts`; otherwise the
    /// retryable outcomes give up.
    pub fn decide(&self, outcome: AttemptOutcome, attempt: u32) -> RetryDecision {
        let attempts_left = attempt < self.max_attempts;

        match outcome {
            AttemptOutcome::Status(200) => RetryDecision::Succeed,
            AttemptOutcome::Status(404) => RetryDecision::GiveUp,
            AttemptOutcome::Status(status) if status == 429 || status >= 500 => {
                if attempts_left {
                    RetryDecision::RetryAfter(self.backoff_unit.saturating_mul(attempt))
                } else {
                    RetryDecision::GiveUp
                }
            }
            AttemptOutcome::Status(_) => RetryDecision::Fail,
            AttemptOutcome::Timeout | AttemptOutcome::Connection => {
                if attempts_left {
                    RetryDecision::RetryAfter(self.backoff_unit)
                } else {
                    RetryDecision::GiveUp
                }
            }
            AttemptOutcome::Transport => RetryDecision::GiveUp,
        }
    }
}
