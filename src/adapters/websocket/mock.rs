//! Mock transport for testing.
//!
//! Provides a scripted, in-memory implementation of the Transport port so
//! session tests run without a socket.
//!
//! # Features
//!
//! - Scripted connect outcomes (accept, refuse, hang), consumed in order
//! - A [`MockPeer`] per accepted connection for driving the server side
//! - Connect attempt tracking with tokio timestamps (works with paused time)
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new().with_outcome(ConnectOutcome::Refuse("down".into()));
//! let handle = spawn_session(settings, Arc::new(transport.clone()));
//!
//! let mut peer = transport.next_peer().await.unwrap();
//! peer.send_text(r#"{"type":"STATUS","connected":true}"#);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

use crate::ports::{CloseReason, InboundFrame, Link, LinkEvent, Transport, TransportError};

/// What the next `connect` call does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Accept,
    Refuse(String),
    /// Never resolves; the attempt stays pending until dropped.
    Hang,
}

/// One recorded `connect` call.
#[derive(Debug, Clone)]
pub struct ConnectAttempt {
    pub endpoint: Url,
    pub at: Instant,
}

/// Server side of an accepted mock connection.
#[derive(Debug)]
pub struct MockPeer {
    to_client: mpsc::UnboundedSender<LinkEvent>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl MockPeer {
    pub fn send_text(&self, frame: impl Into<String>) -> bool {
        self.emit(LinkEvent::Frame(InboundFrame::Text(frame.into())))
    }

    pub fn send_binary(&self, frame: impl Into<Vec<u8>>) -> bool {
        self.emit(LinkEvent::Frame(InboundFrame::Binary(frame.into())))
    }

    /// Server hangs up.
    pub fn close(&self, reason: CloseReason) -> bool {
        self.emit(LinkEvent::Closed(reason))
    }

    /// Connection breaks.
    pub fn fail(&self, error: impl Into<String>) -> bool {
        self.emit(LinkEvent::Failed(error.into()))
    }

    /// Returns false once the client has released the link.
    pub fn emit(&self, event: LinkEvent) -> bool {
        self.to_client.send(event).is_ok()
    }

    /// Next frame the client sent. `None` once the client released the link.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Frame already sent by the client, without waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// True once the client has stopped listening.
    pub fn is_released(&self) -> bool {
        self.to_client.is_closed()
    }
}

/// Mock transport for testing.
#[derive(Debug, Clone)]
pub struct MockTransport {
    /// Outcomes consumed in order; `Accept` once exhausted.
    script: Arc<Mutex<VecDeque<ConnectOutcome>>>,
    /// Call history for verification.
    attempts: Arc<Mutex<Vec<ConnectAttempt>>>,
    peers_tx: mpsc::UnboundedSender<MockPeer>,
    peers_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<MockPeer>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Accepts every connection.
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            attempts: Arc::new(Mutex::new(Vec::new())),
            peers_tx,
            peers_rx: Arc::new(tokio::sync::Mutex::new(peers_rx)),
        }
    }

    /// Queues the outcome of a future connect call.
    pub fn with_outcome(self, outcome: ConnectOutcome) -> Self {
        self.push_outcome(outcome);
        self
    }

    pub fn push_outcome(&self, outcome: ConnectOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn connect_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn attempts(&self) -> Vec<ConnectAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// Waits for the next accepted connection.
    pub async fn next_peer(&self) -> Option<MockPeer> {
        self.peers_rx.lock().await.recv().await
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, endpoint: &Url) -> Result<Link, TransportError> {
        self.attempts.lock().unwrap().push(ConnectAttempt {
            endpoint: endpoint.clone(),
            at: Instant::now(),
        });
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConnectOutcome::Accept);

        match outcome {
            ConnectOutcome::Accept => {
                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
                let _ = self.peers_tx.send(MockPeer {
                    to_client: inbound_tx,
                    from_client: outbound_rx,
                });
                Ok(Link {
                    outbound: outbound_tx,
                    inbound: inbound_rx,
                })
            }
            ConnectOutcome::Refuse(reason) => Err(TransportError::Refused(reason)),
            ConnectOutcome::Hang => std::future::pending().await,
        }
    }
}
