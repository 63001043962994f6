//! Retry bookkeeping and backoff arithmetic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the delay between reconnection attempts evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay before every attempt.
    #[default]
    Fixed,
    /// `base * 2^(attempt - 1)`, capped at `max`.
    Exponential,
}

/// Pure backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub strategy: BackoffStrategy,
    pub base: Duration,
    pub max: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Backoff {
    /// Constant delay, unlimited attempts.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            base: delay,
            max: delay,
            max_attempts: None,
        }
    }

    /// Doubling delay capped at `max`, unlimited attempts.
    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base,
            max,
            max_attempts: None,
        }
    }

    /// Limits the number of consecutive attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay before the given (1-based) attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::Fixed => self.base,
            BackoffStrategy::Exponential => {
                let shift = attempt.saturating_sub(1).min(31);
                self.base
                    .checked_mul(1u32 << shift)
                    .unwrap_or(self.max)
                    .min(self.max)
            }
        }
    }

    /// Whether another attempt is allowed after `attempt` have been made.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(3000))
    }
}

/// Consecutive unplanned disconnects since the last successful connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryState {
    pub attempt: u32,
    pub next_delay: Duration,
}

impl RetryState {
    /// Back to zero after a successful connect.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
