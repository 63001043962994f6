//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `websocket` - Transport implementations (tokio-tungstenite, in-memory mock)

pub mod websocket;

pub use websocket::{MockTransport, WebSocketTransport};
