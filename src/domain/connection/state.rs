//! Connection lifecycle state.
//!
//! ```text
//!                 open                accepted
//! Disconnected ─────────▶ Connecting ─────────▶ Connected
//!   ▲   │  │                  │                     │
//!   │   │  │ give up          │ lost                │ lost / close
//!   │   │  ▼                  ▼                     ▼
//!   │   │ Failed ──open──▶ (Connecting)        Disconnected
//!   │   │ schedule retry
//!   │   ▼
//!   └─ Retrying ──timer──▶ Connecting
//! ```
//!
//! The transport channel only ever moves between `Disconnected`,
//! `Connecting` and `Connected`; `Retrying` and `Failed` are overlaid by the
//! session once the reconnection policy has interpreted a disconnect.

use std::fmt;

use serde::Serialize;

use crate::domain::foundation::StateMachine;

/// Client-side connectivity of one dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Waiting on the reconnection timer.
    Retrying,
    /// The reconnection policy gave up; only an explicit reconnect leaves it.
    Failed,
}

/// Inputs that drive [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// `open` was called (fresh, retry timer, or manual reconnect).
    OpenRequested,
    /// The server accepted the connection.
    Accepted,
    /// Close, error, or server hangup on a live or pending connection.
    Lost,
    /// Reconnection policy scheduled a retry.
    RetryScheduled,
    /// Reconnection policy gave up.
    GaveUp,
    /// Explicit local `close()` / teardown.
    ClosedLocally,
}

impl ConnectionState {
    /// Applies an event, returning the next state.
    ///
    /// Events that have no edge from the current state leave it unchanged.
    /// Every change is checked against [`StateMachine::transition_to`].
    pub fn apply(self, event: ConnectionEvent) -> Self {
        use ConnectionEvent as E;
        use ConnectionState as S;

        let next = match (self, event) {
            (S::Disconnected | S::Retrying | S::Failed, E::OpenRequested) => S::Connecting,
            (S::Connecting, E::Accepted) => S::Connected,
            (S::Connecting | S::Connected, E::Lost) => S::Disconnected,
            (S::Disconnected, E::RetryScheduled) => S::Retrying,
            (S::Disconnected, E::GaveUp) => S::Failed,
            (S::Connecting | S::Connected | S::Retrying | S::Failed, E::ClosedLocally) => {
                S::Disconnected
            }
            (state, _) => return state,
        };

        self.transition_to(next).unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?event, "Rejected connection transition");
            self
        })
    }

    /// True while a connection is pending or established.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// True only when frames can be exchanged.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Label used by the status badges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Retrying => "Retrying",
            Self::Failed => "Error",
        }
    }
}

impl StateMachine for ConnectionState {
    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Disconnected => vec![Connecting, Retrying, Failed],
            Connecting => vec![Connected, Disconnected],
            Connected => vec![Disconnected],
            Retrying => vec![Connecting, Disconnected],
            Failed => vec![Connecting, Disconnected],
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Retrying => "retrying",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
