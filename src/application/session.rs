//! DashboardSession - The single writer behind one dashboard view.
//!
//! One tokio task owns the [`TransportChannel`], the [`ReconnectPolicy`] and
//! the [`DashboardState`]. It reacts to three inputs, one at a time:
//!
//! ```text
//!  SessionHandle ──Command──┐
//!                           ▼
//!  TransportChannel ──▶ select! ──▶ DashboardState (watch) ──▶ views
//!                           ▲
//!  retry deadline ──────────┘
//! ```
//!
//! Views only ever read the `watch` receiver. Ending the task (shutdown or
//! dropping the handle) drops the channel and the pending deadline with it,
//! so no reconnect or state update can happen afterwards.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::domain::connection::{Backoff, ConnectionEvent, ConnectionState};
use crate::domain::foundation::Timestamp;
use crate::domain::telemetry::{
    ClientMessage, DashboardKind, DashboardState, FrameOutcome, Severity,
};
use crate::ports::{InboundFrame, Transport};

use super::channel::{ChannelError, ChannelEvent, ChannelSignal, SendOutcome, TransportChannel};
use super::reconnect::{ReconnectPolicy, RetryDecision};

/// Lines the monitor console starts with.
const MONITOR_BANNER: [(Severity, &str); 3] = [
    (Severity::Info, "Monitor service started."),
    (Severity::Success, "Connected to Docker daemon."),
    (Severity::Info, "Watching for test results in /workspace..."),
];

/// Everything needed to run one session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub kind: DashboardKind,
    pub endpoint: Url,
    pub backoff: Backoff,
    /// Ring-buffer limit for the log stream; `None` keeps everything.
    pub log_capacity: Option<usize>,
}

impl SessionSettings {
    pub fn new(kind: DashboardKind, endpoint: Url) -> Self {
        Self {
            kind,
            endpoint,
            backoff: Backoff::default(),
            log_capacity: None,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.log_capacity = capacity;
        self
    }
}

#[derive(Debug)]
enum Command {
    Send(ClientMessage),
    Reconnect,
    Shutdown,
}

/// Owning handle to a running session.
///
/// Dropping it aborts the session task; [`SessionHandle::shutdown`] is the
/// graceful path.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<DashboardState>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Read-only view of the dashboard state.
    pub fn state(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Sends a message if connected; dropped otherwise.
    ///
    /// Returns false only if the session task has already ended.
    pub fn send(&self, message: ClientMessage) -> bool {
        self.command(Command::Send(message))
    }

    /// Re-opens right away with a fresh attempt count. No-op while a
    /// connection is pending or established.
    pub fn reconnect(&self) -> bool {
        self.command(Command::Reconnect)
    }

    fn command(&self, command: Command) -> bool {
        match self.commands.send(command) {
            Ok(()) => true,
            Err(mpsc::error::SendError(command)) => {
                tracing::debug!(?command, "Session already ended, command discarded");
                false
            }
        }
    }

    /// Closes the connection, cancels any pending retry and waits for the
    /// session task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Dashboard session panicked");
                }
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts a session on the current tokio runtime.
pub fn spawn_session(settings: SessionSettings, transport: Arc<dyn Transport>) -> SessionHandle {
    let (channel, signals) = TransportChannel::new(transport);
    let (state_tx, state_rx) = watch::channel(DashboardState::new(settings.log_capacity));
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();

    let session = DashboardSession {
        policy: ReconnectPolicy::new(settings.backoff),
        settings,
        channel,
        signals,
        commands: commands_rx,
        state: state_tx,
    };

    SessionHandle {
        commands: commands_tx,
        state: state_rx,
        task: Some(tokio::spawn(session.run())),
    }
}

struct DashboardSession {
    settings: SessionSettings,
    channel: TransportChannel,
    signals: mpsc::UnboundedReceiver<ChannelSignal>,
    commands: mpsc::UnboundedReceiver<Command>,
    policy: ReconnectPolicy,
    state: watch::Sender<DashboardState>,
}

impl DashboardSession {
    async fn run(mut self) {
        self.start();

        loop {
            let deadline = self.policy.deadline();
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Send(message)) => self.send(message),
                    Some(Command::Reconnect) => self.reconnect_now(),
                    Some(Command::Shutdown) | None => break,
                },
                Some(signal) = self.signals.recv() => {
                    for event in self.channel.accept(signal) {
                        self.on_event(event);
                    }
                }
                _ = sleep_until(deadline) => self.on_retry_due(),
            }
        }

        self.teardown();
    }

    fn start(&mut self) {
        tracing::info!(
            endpoint = %self.settings.endpoint,
            kind = ?self.settings.kind,
            "Starting dashboard session"
        );
        if self.settings.kind == DashboardKind::Monitor {
            let now = Timestamp::now();
            self.state.send_modify(|state| {
                for (severity, message) in MONITOR_BANNER {
                    state.system_log(severity, message, now);
                }
            });
        }
        self.connect();
    }

    fn connect(&mut self) {
        match self.channel.open(&self.settings.endpoint) {
            Ok(()) => {
                tracing::debug!(endpoint = %self.settings.endpoint, "Opening channel");
                self.transition(ConnectionEvent::OpenRequested);
            }
            Err(ChannelError::AlreadyConnected(state)) => {
                tracing::debug!(%state, "Channel already active, not opening");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot open channel");
                self.policy.cancel();
                self.state.send_modify(|state| {
                    state.connection = ConnectionState::Failed;
                    state.last_transport_error = Some(e.to_string());
                });
            }
        }
    }

    fn send(&mut self, message: ClientMessage) {
        if self.channel.send(&message) == SendOutcome::Sent {
            tracing::trace!(?message, "Client message sent");
        }
    }

    fn on_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Open => self.on_open(),
            ChannelEvent::Message(frame) => self.on_frame(frame),
            ChannelEvent::Error(error) => {
                tracing::warn!(
                    endpoint = %self.settings.endpoint,
                    error = %error,
                    "Transport failure"
                );
                self.state
                    .send_modify(|state| state.last_transport_error = Some(error));
            }
            ChannelEvent::Close(reason) => self.on_unplanned_close(reason.code, &reason.reason),
        }
    }

    fn on_open(&mut self) {
        tracing::info!(endpoint = %self.settings.endpoint, "Channel open");
        self.policy.on_connected();
        let retry = self.policy.retry_state();
        let kind = self.settings.kind;

        self.state.send_modify(|state| {
            state.connection = state.connection.apply(ConnectionEvent::Accepted);
            state.retry = retry;
            state.upstream_connected = None;
            state.last_transport_error = None;
            if kind == DashboardKind::Monitor {
                state.system_log(Severity::Success, "Connected to monitor service.", Timestamp::now());
            }
        });

        if kind == DashboardKind::Debug {
            self.send(ClientMessage::GetDebugMessages);
        }
    }

    fn on_frame(&mut self, frame: InboundFrame) {
        let now = Timestamp::now();
        let mut outcome = None;
        self.state.send_modify(|state| {
            outcome = Some(match &frame {
                InboundFrame::Text(text) => state.ingest_frame(text, now),
                InboundFrame::Binary(bytes) => state.ingest_binary_frame(bytes, now),
            });
        });

        match outcome {
            Some(FrameOutcome::Applied { kind }) => {
                tracing::trace!(frame_type = %kind, "Frame applied");
            }
            Some(FrameOutcome::Ignored { kind }) => {
                tracing::debug!(frame_type = %kind, "Ignoring unknown message type");
            }
            Some(FrameOutcome::Dropped(error)) => {
                tracing::warn!(error = %error, "Dropping malformed frame");
            }
            None => {}
        }
    }

    fn on_unplanned_close(&mut self, code: Option<u16>, reason: &str) {
        let was_connected = self.state.borrow().connection.is_connected();
        let decision = self.policy.on_unplanned_disconnect(Instant::now());
        let retry = self.policy.retry_state();
        let kind = self.settings.kind;

        match decision {
            RetryDecision::Retry { attempt, delay } => {
                tracing::info!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    close_code = ?code,
                    reason,
                    "Channel closed, scheduling reconnect"
                );
            }
            RetryDecision::GiveUp { attempts } => {
                tracing::warn!(attempts, close_code = ?code, "Channel closed, giving up");
            }
        }

        self.state.send_modify(|state| {
            state.connection = state.connection.apply(ConnectionEvent::Lost);
            state.retry = retry;
            state.connection = match decision {
                RetryDecision::Retry { .. } => {
                    state.connection.apply(ConnectionEvent::RetryScheduled)
                }
                RetryDecision::GiveUp { .. } => state.connection.apply(ConnectionEvent::GaveUp),
            };
            if kind == DashboardKind::Monitor && was_connected {
                let message = match decision {
                    RetryDecision::Retry { delay, .. } => format!(
                        "Disconnected from monitor service. Retrying in {}s.",
                        delay.as_secs()
                    ),
                    RetryDecision::GiveUp { .. } => {
                        "Disconnected from monitor service. Giving up.".to_string()
                    }
                };
                state.system_log(Severity::Error, &message, Timestamp::now());
            }
        });
    }

    fn on_retry_due(&mut self) {
        if !self.policy.fire() {
            return;
        }
        tracing::info!(
            attempt = self.policy.retry_state().attempt,
            endpoint = %self.settings.endpoint,
            "Reconnecting"
        );
        self.connect();
    }

    fn reconnect_now(&mut self) {
        if self.channel.state().is_active() {
            tracing::debug!(state = %self.channel.state(), "Manual reconnect ignored");
            return;
        }
        tracing::info!(endpoint = %self.settings.endpoint, "Manual reconnect");
        self.policy.reset();
        let retry = self.policy.retry_state();
        self.state.send_modify(|state| state.retry = retry);
        self.connect();
    }

    fn transition(&mut self, event: ConnectionEvent) {
        self.state
            .send_modify(|state| state.connection = state.connection.apply(event));
    }

    fn teardown(&mut self) {
        self.policy.cancel();
        if self.channel.close() {
            tracing::debug!("Released channel on teardown");
        }
        self.transition(ConnectionEvent::ClosedLocally);
        tracing::info!(endpoint = %self.settings.endpoint, "Dashboard session stopped");
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::MockTransport;

    fn settings(kind: DashboardKind) -> SessionSettings {
        SessionSettings::new(kind, Url::parse("ws://localhost:10004/ws").unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_seeds_banner_before_connecting() {
        let transport = MockTransport::new();
        let handle = spawn_session(settings(DashboardKind::Monitor), Arc::new(transport.clone()));

        let mut rx = handle.state();
        {
            let state = rx.wait_for(|s| s.logs.count() >= 3).await.unwrap();
            assert_eq!(
                state.logs.at(0).unwrap().message,
                "[SYSTEM] Monitor service started."
            );
            assert_eq!(state.logs.at(1).unwrap().severity, Severity::Success);
        }
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn debug_dashboard_starts_with_empty_log() {
        let transport = MockTransport::new();
        let handle = spawn_session(settings(DashboardKind::Debug), Arc::new(transport.clone()));
        tokio::task::yield_now().await;
        assert!(handle.snapshot().logs.is_empty());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_endpoint_fails_without_retrying() {
        let transport = MockTransport::new();
        let settings =
            SessionSettings::new(DashboardKind::Debug, Url::parse("http://localhost/ws").unwrap());
        let handle = spawn_session(settings, Arc::new(transport.clone()));
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;

        let state = handle.snapshot();
        assert_eq!(state.connection, ConnectionState::Failed);
        assert!(state.last_transport_error.is_some());
        assert_eq!(transport.connect_count(), 0);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn commands_reach_a_running_session() {
        let transport = MockTransport::new();
        let handle = spawn_session(settings(DashboardKind::Debug), Arc::new(transport.clone()));
        assert!(handle.send(ClientMessage::GetDebugMessages));
        assert!(handle.reconnect());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn commands_to_an_ended_session_are_reported() {
        let (commands, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let (_state_tx, state) = watch::channel(DashboardState::default());
        let handle = SessionHandle {
            commands,
            state,
            task: None,
        };

        assert!(!handle.send(ClientMessage::GetDebugMessages));
        assert!(!handle.reconnect());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_leaves_state_disconnected() {
        let transport = MockTransport::new();
        let handle = spawn_session(settings(DashboardKind::Debug), Arc::new(transport.clone()));
        let _peer = transport.next_peer().await.unwrap();

        let state = handle.state();
        handle.shutdown().await;
        assert_eq!(state.borrow().connection, ConnectionState::Disconnected);
    }
}
