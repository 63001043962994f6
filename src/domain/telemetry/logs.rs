//! Append-only log stream with optional ring-buffer retention.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Severity of a log line. Unrecognized labels read as `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "success" => Severity::Success,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// One rendered log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: Timestamp,
    pub message: String,
    pub severity: Severity,
}

/// Ordered log lines in arrival order.
///
/// Unbounded unless a capacity is set, in which case the oldest entries are
/// evicted first. `at(i)` is O(1); indices shift only when an eviction
/// happens.
#[derive(Debug, Clone)]
pub struct LogStreamBuffer {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
    next_id: u64,
    evicted: u64,
}

impl LogStreamBuffer {
    /// Creates a buffer; `None` keeps every entry.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.map(|c| c.max(1)),
            next_id: 1,
            evicted: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    /// Appends an entry that already carries an id. Returns the id stored.
    ///
    /// Ids stay strictly increasing: an id at or below the last one is
    /// replaced with the next client-side id.
    pub fn append(&mut self, mut entry: LogEntry) -> u64 {
        if entry.id < self.next_id {
            entry.id = self.next_id;
        }
        self.next_id = entry.id.saturating_add(1);
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
        let id = entry.id;
        self.entries.push_back(entry);
        id
    }

    /// Appends a line, assigning the next client-side id. Returns that id.
    pub fn record(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> u64 {
        self.append(LogEntry {
            id: self.next_id,
            timestamp,
            message: message.into(),
            severity,
        })
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Entries dropped by the retention limit so far.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Id the next `record` call will assign.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

impl Default for LogStreamBuffer {
    fn default() -> Self {
        Self::unbounded()
    }
}
