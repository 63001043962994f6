//! Transport port - Interface for one duplex streaming connection.
//!
//! A `Transport` turns an endpoint address into a [`Link`]: an outbound
//! sender for text frames and an inbound receiver of [`LinkEvent`]s.
//!
//! ## Link contract
//!
//! - Inbound events arrive in the order the peer sent them.
//! - `Closed` or `Failed` is the last event of a link; the receiver ends
//!   right after it.
//! - Dropping the outbound sender asks the adapter to close the
//!   connection gracefully. Dropping the inbound receiver releases it too.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

/// One frame received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    /// Close code from the peer's close frame, if it sent one.
    pub code: Option<u16>,
    pub reason: String,
}

impl CloseReason {
    pub fn new(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Connection ended without a close handshake.
    pub fn abnormal() -> Self {
        Self::new(Some(1006), "connection lost")
    }

    /// Close code 1000.
    pub fn normal() -> Self {
        Self::new(Some(1000), "")
    }
}

/// Event delivered on a link's inbound side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Frame(InboundFrame),
    /// The connection closed (peer close frame, or stream ended).
    Closed(CloseReason),
    /// The connection broke (reset, protocol error).
    Failed(String),
}

/// Established connection handed back by [`Transport::connect`].
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Errors establishing a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Peer unreachable or refused the connection
    #[error("connection refused: {0}")]
    Refused(String),

    /// Handshake did not finish in time
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    /// Handshake completed but was rejected or malformed
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Port for opening streaming connections to a telemetry endpoint.
///
/// Implementations:
/// - `WebSocketTransport` - real connections over tokio-tungstenite
/// - `MockTransport` - scripted in-memory links for tests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens one connection. Resolves once the server has accepted it.
    async fn connect(&self, endpoint: &Url) -> Result<Link, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn transport_is_object_safe() {
        fn _accepts_dyn(_transport: &dyn Transport) {}
    }

    #[test]
    fn abnormal_close_uses_1006() {
        assert_eq!(CloseReason::abnormal().code, Some(1006));
        assert_eq!(CloseReason::normal().code, Some(1000));
    }

    #[test]
    fn transport_error_messages_are_readable() {
        let err = TransportError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "connection timed out after 10s");
        let err = TransportError::Refused("Connection refused (os error 111)".into());
        assert!(err.to_string().starts_with("connection refused"));
    }
}
