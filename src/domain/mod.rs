//! Domain layer: pure, synchronous logic with no I/O.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, validation errors, state machine trait)
//! - `connection` - Connection lifecycle state and retry bookkeeping
//! - `telemetry` - Wire protocol, status snapshots, log stream, dashboard reducer
//! - `viewport` - Virtualized list geometry

pub mod connection;
pub mod foundation;
pub mod telemetry;
pub mod viewport;
