//! Telemetry payloads and the state they are reduced into.
//!
//! # Data flow
//!
//! ```text
//! raw frame ──decode_frame──▶ ServerMessage ──DashboardState::apply──▶ state
//!                   │
//!                   └─ FrameError ──▶ diagnostics (frame dropped, session continues)
//! ```

pub mod logs;
pub mod messages;
pub mod state;
pub mod status;

pub use logs::{LogEntry, LogStreamBuffer, Severity};
pub use messages::{
    decode_binary_frame, decode_frame, ClientMessage, FrameError, LogFrame, ServerMessage,
};
pub use state::{DashboardKind, DashboardState, FrameDiagnostics, FrameOutcome};
pub use status::{ContainerInfo, ContainerStatus, StatusSnapshot, TestCounts};
