//! Plain-text composition of the debug and monitor dashboards.
//!
//! Pure functions of [`DashboardState`]; nothing here mutates state.

use crate::domain::connection::ConnectionState;
use crate::domain::telemetry::DashboardState;

use super::log_list::LogListRenderer;

pub const NO_MESSAGES: &str = "No messages found.";
pub const NO_CONTAINERS: &str = "No containers found for this project.";

/// Whether a stat card needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Good,
    Bad,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub subtitle: String,
    pub trend: Trend,
}

/// Debug dashboard status line.
pub fn debug_status_label(state: &DashboardState) -> String {
    match state.connection {
        ConnectionState::Connected => match state.upstream_connected {
            Some(true) => "Connected to DB".to_string(),
            Some(false) => "DB Connection Pending...".to_string(),
            None => "Connected".to_string(),
        },
        ConnectionState::Retrying => {
            let millis = state.retry.next_delay.as_millis();
            format!("Reconnecting in {}s", millis.div_ceil(1000))
        }
        other => other.label().to_string(),
    }
}

/// `Live` while the channel is connected.
pub fn live_indicator(state: &DashboardState) -> &'static str {
    if state.connection.is_connected() {
        "Live"
    } else {
        "Offline"
    }
}

/// The four monitor stat cards, left to right.
pub fn monitor_stats(state: &DashboardState) -> [StatCard; 4] {
    let snapshot = &state.status;
    let failed = snapshot.total_failed();
    let connected = state.connection.is_connected();

    [
        StatCard {
            title: "Active Containers",
            value: snapshot.running_count().to_string(),
            subtitle: format!("Out of {} total", snapshot.containers.len()),
            trend: Trend::Neutral,
        },
        StatCard {
            title: "Tests Passed",
            value: snapshot.total_passed().to_string(),
            subtitle: "Combined success".to_string(),
            trend: Trend::Neutral,
        },
        StatCard {
            title: "Tests Failed",
            value: failed.to_string(),
            subtitle: "Requires attention".to_string(),
            trend: if failed > 0 { Trend::Bad } else { Trend::Good },
        },
        StatCard {
            title: "Loop Status",
            value: if connected { "Active" } else { "Stopped" }.to_string(),
            subtitle: "System heartbeat".to_string(),
            trend: Trend::Neutral,
        },
    ]
}

pub fn render_debug(state: &DashboardState) -> String {
    let mut lines = vec![
        "Dev Frontend Dashboard".to_string(),
        format!("Status: {}", debug_status_label(state)),
        String::new(),
        "Debug Messages".to_string(),
    ];
    if state.debug_messages.is_empty() {
        lines.push(NO_MESSAGES.to_string());
    } else {
        lines.extend(state.debug_messages.iter().map(|m| format!("- {}", m)));
    }
    lines.join("\n")
}

pub fn render_monitor(state: &DashboardState, console: &LogListRenderer) -> String {
    let mut header = format!("Live Status Monitor [{}]", live_indicator(state));
    if let Some(at) = state.last_update {
        header.push_str(&format!("  Last update: {}", at.clock_label()));
    }
    let mut lines = vec![header, String::new()];

    for card in monitor_stats(state) {
        let marker = if card.trend == Trend::Bad { " (!)" } else { "" };
        lines.push(format!(
            "{:<18} {:>8}{}  {}",
            card.title, card.value, marker, card.subtitle
        ));
    }

    lines.push(String::new());
    lines.push("Containers".to_string());
    if state.status.containers.is_empty() {
        lines.push(NO_CONTAINERS.to_string());
    } else {
        lines.push(format!("{:<24} {:<10} {}", "NAME", "STATUS", "ID"));
        for container in &state.status.containers {
            lines.push(format!(
                "{:<24} {:<10} {}",
                container.name,
                container.status.as_str(),
                container.id
            ));
        }
    }

    lines.push(String::new());
    lines.push("Test Summary".to_string());
    for suite in state.status.suite_names() {
        let counts = state.status.suite(suite);
        lines.push(format!(
            "{:<12} passed {:>5}  failed {:>5}",
            suite, counts.passed, counts.failed
        ));
    }
    lines.push(format!("Total Passed {}", state.status.total_passed()));
    lines.push(format!("Total Failed {}", state.status.total_failed()));

    lines.push(String::new());
    lines.push("Console Logs".to_string());
    lines.extend(
        console
            .render(&state.logs)
            .into_iter()
            .map(|row| format!("{:<7} {}", row.severity.as_str(), row.text)),
    );

    lines.join("\n")
}
