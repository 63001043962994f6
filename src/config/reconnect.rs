//! Reconnection backoff configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::connection::{Backoff, BackoffStrategy};

use super::error::ValidationError;

/// Retry schedule after an unplanned disconnect.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default)]
    pub strategy: BackoffStrategy,

    /// Fixed delay, or the first delay of an exponential schedule
    #[serde(default = "default_base_ms")]
    pub base_ms: u64,

    /// Cap for the exponential schedule
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,

    /// Consecutive attempts before giving up; unset retries forever
    pub max_attempts: Option<u32>,
}

impl ReconnectConfig {
    pub fn backoff(&self) -> Backoff {
        let base = Duration::from_millis(self.base_ms);
        let backoff = match self.strategy {
            BackoffStrategy::Fixed => Backoff::fixed(base),
            BackoffStrategy::Exponential => {
                Backoff::exponential(base, Duration::from_millis(self.max_ms))
            }
        };
        match self.max_attempts {
            Some(max) => backoff.with_max_attempts(max),
            None => backoff,
        }
    }

    /// Validate reconnect configuration
    ///
    /// A zero base delay would reconnect in a tight loop against a refusing
    /// server, so it is rejected for both strategies.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_ms == 0 {
            return Err(ValidationError::InvalidBackoff);
        }
        if self.strategy == BackoffStrategy::Exponential && self.max_ms < self.base_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            base_ms: default_base_ms(),
            max_ms: default_max_ms(),
            max_attempts: None,
        }
    }
}

fn default_base_ms() -> u64 {
    3000
}

fn default_max_ms() -> u64 {
    30_000
}
