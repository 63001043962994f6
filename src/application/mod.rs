//! Application layer - Connection lifecycle and the dashboard session loop.
//!
//! - `channel` - `TransportChannel`, one owned connection with ordered events
//! - `reconnect` - `ReconnectPolicy`, retry timing after unplanned disconnects
//! - `session` - `spawn_session` / `SessionHandle`, the single-writer event loop

pub mod channel;
pub mod reconnect;
pub mod session;

pub use channel::{ChannelError, ChannelEvent, ChannelSignal, SendOutcome, TransportChannel};
pub use reconnect::{ReconnectPolicy, RetryDecision};
pub use session::{spawn_session, SessionHandle, SessionSettings};
