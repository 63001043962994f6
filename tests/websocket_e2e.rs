//! End-to-end tests against a real WebSocket server.
//!
//! Runs a small axum server on an ephemeral port that behaves like the
//! debug backend:
//! - announces `STATUS` on every connection
//! - answers `GET_DEBUG_MESSAGES` with a `DEBUG_MESSAGES` frame
//! - hangs up the first connection after answering, so the client has to
//!   reconnect

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use url::Url;

use live_status::adapters::WebSocketTransport;
use live_status::application::{spawn_session, SessionHandle, SessionSettings};
use live_status::domain::connection::{Backoff, ConnectionState};
use live_status::domain::telemetry::{DashboardKind, DashboardState};
use live_status::view::debug_status_label;

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Clone, Default)]
struct ServerState {
    connections: Arc<AtomicUsize>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let connection = state.connections.fetch_add(1, Ordering::SeqCst) + 1;
    ws.on_upgrade(move |socket| serve_debug(socket, connection))
}

async fn serve_debug(mut socket: WebSocket, connection: usize) {
    let status = r#"{"type":"STATUS","connected":true}"#.to_string();
    if socket.send(Message::Text(status)).await.is_err() {
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(text) = message else {
            continue;
        };
        if text.contains("GET_DEBUG_MESSAGES") {
            let reply = format!(
                r#"{{"type":"DEBUG_MESSAGES","data":["connection {}","ready"]}}"#,
                connection
            );
            if socket.send(Message::Text(reply)).await.is_err() {
                return;
            }
            if connection == 1 {
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        }
    }
}

async fn start_server() -> (SocketAddr, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn debug_settings(addr: SocketAddr) -> SessionSettings {
    let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
    SessionSettings::new(DashboardKind::Debug, endpoint)
        .with_backoff(Backoff::fixed(Duration::from_millis(100)))
}

async fn wait_until(
    handle: &SessionHandle,
    predicate: impl FnMut(&DashboardState) -> bool,
) -> DashboardState {
    let mut rx = handle.state();
    let state = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(predicate))
        .await
        .expect("state never matched")
        .expect("session ended");
    state.clone()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn debug_session_receives_status_and_messages() {
    let (addr, _server) = start_server().await;
    let handle = spawn_session(
        debug_settings(addr),
        Arc::new(WebSocketTransport::default()),
    );

    let state = wait_until(&handle, |s| {
        s.upstream_connected == Some(true) && !s.debug_messages.is_empty()
    })
    .await;

    assert_eq!(state.debug_messages[0], "connection 1");
    assert_eq!(state.debug_messages[1], "ready");
    handle.shutdown().await;
}

#[tokio::test]
async fn server_hangup_triggers_reconnect() {
    let (addr, server) = start_server().await;
    let handle = spawn_session(
        debug_settings(addr),
        Arc::new(WebSocketTransport::default()),
    );

    let state = wait_until(&handle, |s| {
        s.connection == ConnectionState::Connected
            && s.debug_messages.first().map(String::as_str) == Some("connection 2")
    })
    .await;

    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
    assert_eq!(state.retry.attempt, 0);
    assert_eq!(debug_status_label(&state), "Connected to DB");
    handle.shutdown().await;
}

#[tokio::test]
async fn refused_connection_schedules_retry() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
    let settings = SessionSettings::new(DashboardKind::Monitor, endpoint);
    let handle = spawn_session(settings, Arc::new(WebSocketTransport::default()));

    let state = wait_until(&handle, |s| s.connection == ConnectionState::Retrying).await;
    assert_eq!(state.retry.attempt, 1);
    assert_eq!(state.retry.next_delay, Duration::from_millis(3000));
    assert!(state.last_transport_error.is_some());
    handle.shutdown().await;
}
