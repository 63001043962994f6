//! TransportChannel - One owned streaming connection with ordered events.
//!
//! The channel never calls back into its owner. A connection task forwards
//! everything the [`Link`] produces as [`ChannelSignal`]s on an mpsc queue;
//! the owner feeds each signal back through [`TransportChannel::accept`],
//! which updates the channel state and yields the observable
//! [`ChannelEvent`]s.
//!
//! ## Generations
//!
//! Every `open` starts a new generation and every `close` ends it. Signals
//! tagged with an older generation are dropped in `accept`, so a connection
//! that was explicitly closed (or replaced) can never deliver an event
//! afterwards.
//!
//! ## Release
//!
//! `close()` aborts the connection task and drops the outbound sender,
//! which releases the underlying connection. `Drop` calls `close()`, so every
//! exit path releases it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::domain::connection::{ConnectionEvent, ConnectionState};
use crate::domain::telemetry::ClientMessage;
use crate::ports::{CloseReason, InboundFrame, LinkEvent, Transport};

/// Errors returned by [`TransportChannel::open`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// A connection is already pending or established
    #[error("channel is already {0}")]
    AlreadyConnected(ConnectionState),

    /// Endpoint is not a ws:// or wss:// address
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

/// Observable lifecycle and message events, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Open,
    Message(InboundFrame),
    Close(CloseReason),
    Error(String),
}

/// Result of [`TransportChannel::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Not connected (or the link just went away); the frame was discarded.
    Dropped,
}

/// Raw notification from a connection task.
#[derive(Debug)]
pub struct ChannelSignal {
    generation: u64,
    kind: SignalKind,
}

#[derive(Debug)]
enum SignalKind {
    Opened(mpsc::UnboundedSender<String>),
    Link(LinkEvent),
    ConnectFailed(String),
}

/// Owns at most one connection at a time.
///
/// Moves only between `Disconnected`, `Connecting` and `Connected`.
pub struct TransportChannel {
    transport: Arc<dyn Transport>,
    signals: mpsc::UnboundedSender<ChannelSignal>,
    state: ConnectionState,
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    task: Option<JoinHandle<()>>,
}

impl TransportChannel {
    /// Creates a disconnected channel and the queue its signals arrive on.
    pub fn new(transport: Arc<dyn Transport>) -> (Self, mpsc::UnboundedReceiver<ChannelSignal>) {
        let (signals, signal_rx) = mpsc::unbounded_channel();
        let channel = Self {
            transport,
            signals,
            state: ConnectionState::Disconnected,
            generation: 0,
            outbound: None,
            task: None,
        };
        (channel, signal_rx)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Starts connecting. Must be called inside a tokio runtime.
    pub fn open(&mut self, endpoint: &Url) -> Result<(), ChannelError> {
        if self.state.is_active() {
            return Err(ChannelError::AlreadyConnected(self.state));
        }
        validate_endpoint(endpoint)?;

        self.release();
        self.generation += 1;
        self.state = self.state.apply(ConnectionEvent::OpenRequested);

        let generation = self.generation;
        let transport = Arc::clone(&self.transport);
        let signals = self.signals.clone();
        let endpoint = endpoint.clone();

        self.task = Some(tokio::spawn(async move {
            let emit = |kind| signals.send(ChannelSignal { generation, kind }).is_ok();

            let mut link = match transport.connect(&endpoint).await {
                Ok(link) => link,
                Err(e) => {
                    emit(SignalKind::ConnectFailed(e.to_string()));
                    return;
                }
            };
            if !emit(SignalKind::Opened(link.outbound)) {
                return;
            }
            while let Some(event) = link.inbound.recv().await {
                let last = matches!(event, LinkEvent::Closed(_) | LinkEvent::Failed(_));
                if !emit(SignalKind::Link(event)) || last {
                    return;
                }
            }
            // Adapter went away without saying why.
            emit(SignalKind::Link(LinkEvent::Closed(CloseReason::abnormal())));
        }));

        Ok(())
    }

    /// Interprets one signal, returning the events it produces.
    ///
    /// Stale signals (from a closed or replaced connection) produce nothing.
    pub fn accept(&mut self, signal: ChannelSignal) -> Vec<ChannelEvent> {
        if signal.generation != self.generation || self.state == ConnectionState::Disconnected {
            tracing::trace!(
                signal_generation = signal.generation,
                generation = self.generation,
                "Dropping stale channel signal"
            );
            return Vec::new();
        }

        match signal.kind {
            SignalKind::Opened(outbound) => {
                self.outbound = Some(outbound);
                self.state = self.state.apply(ConnectionEvent::Accepted);
                vec![ChannelEvent::Open]
            }
            SignalKind::Link(LinkEvent::Frame(frame)) => vec![ChannelEvent::Message(frame)],
            SignalKind::Link(LinkEvent::Closed(reason)) => {
                self.end();
                vec![ChannelEvent::Close(reason)]
            }
            SignalKind::Link(LinkEvent::Failed(error)) | SignalKind::ConnectFailed(error) => {
                self.end();
                vec![
                    ChannelEvent::Error(error),
                    ChannelEvent::Close(CloseReason::abnormal()),
                ]
            }
        }
    }

    /// Serializes and transmits a message. Never fails: while not connected
    /// the frame is dropped and logged.
    pub fn send(&self, message: &ClientMessage) -> SendOutcome {
        let Some(outbound) = self.outbound.as_ref().filter(|_| self.state.is_connected()) else {
            tracing::debug!(state = %self.state, ?message, "Dropping send while not connected");
            return SendOutcome::Dropped;
        };

        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, ?message, "Failed to serialize client message");
                return SendOutcome::Dropped;
            }
        };

        match outbound.send(frame) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => {
                tracing::debug!(?message, "Dropping send on a link that just closed");
                SendOutcome::Dropped
            }
        }
    }

    /// Releases the connection, if any. Emits no events.
    ///
    /// Returns true if a connection was pending or established.
    pub fn close(&mut self) -> bool {
        let was_active = self.state.is_active();
        self.end();
        self.release();
        was_active
    }

    /// Ends the current generation.
    fn end(&mut self) {
        self.generation += 1;
        self.outbound = None;
        self.state = self.state.apply(ConnectionEvent::ClosedLocally);
    }

    fn release(&mut self) {
        self.outbound = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TransportChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn validate_endpoint(endpoint: &Url) -> Result<(), ChannelError> {
    let invalid = |reason: &str| ChannelError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: reason.to_string(),
    };
    match endpoint.scheme() {
        "ws" | "wss" => {}
        _ => return Err(invalid("scheme must be ws or wss")),
    }
    if endpoint.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}
