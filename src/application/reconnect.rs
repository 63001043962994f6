//! ReconnectPolicy - When to re-open a channel after an unplanned disconnect.
//!
//! The policy owns the retry bookkeeping and the pending deadline, but no
//! timer task: the session loop sleeps until [`ReconnectPolicy::deadline`],
//! so dropping the loop (or calling [`ReconnectPolicy::cancel`]) is all it
//! takes to guarantee no attempt fires later.

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::connection::{Backoff, RetryState};

/// What to do after an unplanned disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-open after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// Attempt limit reached; stay down until a manual reconnect.
    GiveUp { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    backoff: Backoff,
    retry: RetryState,
    deadline: Option<Instant>,
}

impl ReconnectPolicy {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            backoff,
            retry: RetryState::default(),
            deadline: None,
        }
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry
    }

    /// Pending retry time, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Counts the attempt and schedules the next one.
    pub fn on_unplanned_disconnect(&mut self, now: Instant) -> RetryDecision {
        let attempt = self.retry.attempt.saturating_add(1);
        if !self.backoff.allows(attempt) {
            self.deadline = None;
            self.retry.next_delay = Duration::ZERO;
            return RetryDecision::GiveUp {
                attempts: self.retry.attempt,
            };
        }

        let delay = self.backoff.delay_for(attempt);
        self.retry = RetryState {
            attempt,
            next_delay: delay,
        };
        self.deadline = Some(now + delay);
        RetryDecision::Retry { attempt, delay }
    }

    /// Consumes the deadline once it has passed. Returns false if nothing
    /// was scheduled (cancelled in the meantime).
    pub fn fire(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// A connection was accepted: attempts start over.
    pub fn on_connected(&mut self) {
        self.retry.reset();
        self.deadline = None;
    }

    /// Drops any pending retry without touching the attempt count.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Manual reconnect: cancel and start counting from zero.
    pub fn reset(&mut self) {
        self.retry.reset();
        self.deadline = None;
    }
}
