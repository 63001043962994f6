//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Transport Ports
//!
//! - `Transport` - Opens a duplex streaming connection to a telemetry endpoint
//! - `Link` - The outbound sender / inbound event receiver pair it returns

mod transport;

pub use transport::{CloseReason, InboundFrame, Link, LinkEvent, Transport, TransportError};
