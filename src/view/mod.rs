//! View composition - thin, read-only consumers of `DashboardState`.
//!
//! - `log_list` - virtualized console rows
//! - `render` - text rendering of the debug and monitor dashboards

pub mod log_list;
pub mod render;

pub use log_list::{format_log_line, LogListRenderer, LogRow};
pub use render::{
    debug_status_label, live_indicator, monitor_stats, render_debug, render_monitor, StatCard,
    Trend, NO_CONTAINERS, NO_MESSAGES,
};
