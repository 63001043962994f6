//! Connection lifecycle and retry primitives.

mod retry;
mod state;

pub use retry::{Backoff, BackoffStrategy, RetryState};
pub use state::{ConnectionEvent, ConnectionState};
