//! Timestamp value object for log entries and snapshot arrival times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Immutable point in time, always UTC.
///
/// Serializes as an ISO-8601 string, the format the telemetry producer
/// uses for log timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parses an ISO-8601 / RFC 3339 string, normalizing to UTC.
    pub fn parse_iso(value: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::invalid_timestamp(value, e.to_string()))
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Wall-clock portion (`HH:MM:SS`) shown in log rows.
    pub fn clock_label(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}
