//! Live Status - Resilient live-status synchronization client
//!
//! Keeps a streaming connection to a telemetry producer alive, reduces the
//! frames it pushes into dashboard state, and renders that state (including
//! an unbounded, virtualized log console) for two dashboards: a debug
//! message list and a container/test monitor.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod view;
