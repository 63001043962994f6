//! Whole-state status snapshot pushed by the monitor producer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Suites the monitor dashboard always shows, even before results exist.
pub const DEFAULT_SUITES: [&str; 2] = ["backend", "frontend"];

/// Container lifecycle as reported by the producer.
///
/// Anything other than `running`/`exited` (`created`, `paused`,
/// `restarting`, ...) is folded into `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ContainerStatus {
    Running,
    Exited,
    #[default]
    Unknown,
}

impl From<String> for ContainerStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "running" => ContainerStatus::Running,
            "exited" => ContainerStatus::Exited,
            _ => ContainerStatus::Unknown,
        }
    }
}

impl ContainerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Running => "running",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Unknown => "unknown",
        }
    }
}

/// One container row. Identity is `id` only; duplicates are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: ContainerStatus,
}

/// Pass/fail counters for one test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestCounts {
    #[serde(default)]
    pub passed: u64,
    #[serde(default)]
    pub failed: u64,
}

/// Complete status of the watched project.
///
/// Each snapshot supersedes the previous one wholesale: a field missing from
/// the wire payload deserializes as empty, never as "keep the old value".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub containers: Vec<ContainerInfo>,
    #[serde(default)]
    pub tests: BTreeMap<String, TestCounts>,
}

impl StatusSnapshot {
    /// Containers currently in the `running` state.
    pub fn running_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| c.status == ContainerStatus::Running)
            .count()
    }

    /// Counters for a suite; zero when the suite is absent.
    pub fn suite(&self, name: &str) -> TestCounts {
        self.tests.get(name).copied().unwrap_or_default()
    }

    /// Suite names to display: the defaults first, then any extras in order.
    pub fn suite_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = DEFAULT_SUITES.to_vec();
        names.extend(
            self.tests
                .keys()
                .map(String::as_str)
                .filter(|name| !DEFAULT_SUITES.contains(name)),
        );
        names
    }

    pub fn total_passed(&self) -> u64 {
        self.tests.values().map(|t| t.passed).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.tests.values().map(|t| t.failed).sum()
    }
}
