//! WebSocket adapters implementing the Transport port.
//!
//! # Components
//!
//! - [`client`] - `WebSocketTransport`, real connections via tokio-tungstenite
//! - [`mock`] - `MockTransport`, scripted in-memory links for tests

pub mod client;
pub mod mock;

pub use client::WebSocketTransport;
pub use mock::{ConnectAttempt, ConnectOutcome, MockPeer, MockTransport};
