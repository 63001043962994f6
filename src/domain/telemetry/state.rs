//! Dashboard state and the snapshot reducer.
//!
//! The session loop is the only writer. Views take a read-only borrow at
//! render time.

use serde::Deserialize;

use crate::domain::connection::{ConnectionState, RetryState};
use crate::domain::foundation::Timestamp;

use super::logs::{LogEntry, LogStreamBuffer, Severity};
use super::messages::{decode_binary_frame, decode_frame, FrameError, ServerMessage};
use super::status::StatusSnapshot;

/// Which of the two dashboards a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    /// Debug message list; asks for `GET_DEBUG_MESSAGES` on every open.
    Debug,
    /// Container/test monitor fed by whole-state snapshots.
    #[default]
    Monitor,
}

/// Counters describing how inbound frames were handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDiagnostics {
    pub applied: u64,
    pub ignored: u64,
    pub malformed: u64,
    pub last_error: Option<String>,
}

/// What the reducer did with one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Applied { kind: String },
    /// Unknown message type; logged, state untouched.
    Ignored { kind: String },
    /// Failed to decode; dropped, session continues.
    Dropped(FrameError),
}

/// Everything one dashboard view displays.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The client's own channel connectivity.
    pub connection: ConnectionState,
    pub retry: RetryState,
    /// Producer's upstream connectivity from the last `STATUS` frame.
    pub upstream_connected: Option<bool>,
    pub debug_messages: Vec<String>,
    pub status: StatusSnapshot,
    pub logs: LogStreamBuffer,
    /// Arrival time of the last whole-state snapshot.
    pub last_update: Option<Timestamp>,
    pub diagnostics: FrameDiagnostics,
    /// Last transport failure, cleared on the next successful open.
    pub last_transport_error: Option<String>,
}

impl DashboardState {
    pub fn new(log_capacity: Option<usize>) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            retry: RetryState::default(),
            upstream_connected: None,
            debug_messages: Vec::new(),
            status: StatusSnapshot::default(),
            logs: LogStreamBuffer::new(log_capacity),
            last_update: None,
            diagnostics: FrameDiagnostics::default(),
            last_transport_error: None,
        }
    }

    /// Decodes and applies one text frame.
    pub fn ingest_frame(&mut self, raw: &str, now: Timestamp) -> FrameOutcome {
        self.ingest(decode_frame(raw), now)
    }

    /// Decodes and applies one binary frame.
    pub fn ingest_binary_frame(&mut self, raw: &[u8], now: Timestamp) -> FrameOutcome {
        self.ingest(decode_binary_frame(raw), now)
    }

    fn ingest(&mut self, decoded: Result<ServerMessage, FrameError>, now: Timestamp) -> FrameOutcome {
        match decoded {
            Ok(message) => self.apply(message, now),
            Err(err) => {
                self.diagnostics.malformed += 1;
                self.diagnostics.last_error = Some(err.to_string());
                FrameOutcome::Dropped(err)
            }
        }
    }

    /// Applies a decoded message.
    ///
    /// Bulk payloads replace the previous value wholesale; nothing is merged.
    pub fn apply(&mut self, message: ServerMessage, now: Timestamp) -> FrameOutcome {
        let kind = message.kind().to_string();
        match message {
            ServerMessage::Status { connected } => {
                self.upstream_connected = Some(connected);
            }
            ServerMessage::DebugMessages(messages) => {
                self.debug_messages = messages;
            }
            ServerMessage::Snapshot(snapshot) => {
                self.status = snapshot;
                self.last_update = Some(now);
            }
            ServerMessage::Log(frame) => {
                let timestamp = frame.timestamp.unwrap_or(now);
                match frame.id {
                    Some(id) if id >= self.logs.next_id() => {
                        self.logs.append(LogEntry {
                            id,
                            timestamp,
                            message: frame.message,
                            severity: frame.severity,
                        });
                    }
                    _ => {
                        self.logs.record(frame.severity, frame.message, timestamp);
                    }
                }
            }
            ServerMessage::Unknown { .. } => {
                self.diagnostics.ignored += 1;
                return FrameOutcome::Ignored { kind };
            }
        }
        self.diagnostics.applied += 1;
        FrameOutcome::Applied { kind }
    }

    /// Appends a client-generated `[SYSTEM]` line.
    pub fn system_log(&mut self, severity: Severity, message: &str, now: Timestamp) -> u64 {
        self.logs.record(severity, format!("[SYSTEM] {}", message), now)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::status::{ContainerInfo, ContainerStatus};

    fn now() -> Timestamp {
        Timestamp::parse_iso("2024-01-15T10:30:00Z").unwrap()
    }

    #[test]
    fn dashboard_kind_reads_lowercase() {
        let kind: DashboardKind = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(kind, DashboardKind::Debug);
        assert_eq!(DashboardKind::default(), DashboardKind::Monitor);
    }

    #[test]
    fn status_frame_sets_upstream_flag_only() {
        let mut state = DashboardState::default();
        state.ingest_frame(r#"{"containers":[{"id":"a","name":"api","status":"running"}]}"#, now());
        let outcome = state.ingest_frame(r#"{"type":"STATUS","connected":false}"#, now());

        assert_eq!(outcome, FrameOutcome::Applied { kind: "STATUS".into() });
        assert_eq!(state.upstream_connected, Some(false));
        assert_eq!(state.status.containers.len(), 1);
    }

    #[test]
    fn debug_messages_replace_previous_list() {
        let mut state = DashboardState::default();
        state.ingest_frame(r#"{"type":"DEBUG_MESSAGES","data":["a","b","c"]}"#, now());
        state.ingest_frame(r#"{"type":"DEBUG_MESSAGES","data":["d"]}"#, now());
        assert_eq!(state.debug_messages, vec!["d".to_string()]);
    }

    #[test]
    fn snapshot_replaces_never_merges() {
        let mut state = DashboardState::default();
        state.ingest_frame(
            r#"{"containers":[{"id":"a","name":"A","status":"running"},{"id":"b","name":"B","status":"exited"}],
                "tests":{"backend":{"passed":4,"failed":0}}}"#,
            now(),
        );
        assert_eq!(state.status.containers.len(), 2);

        state.ingest_frame(r#"{"containers":[]}"#, now());
        assert!(state.status.containers.is_empty());
        assert!(state.status.tests.is_empty(), "omitted field must not survive");
    }

    #[test]
    fn snapshot_stamps_last_update() {
        let mut state = DashboardState::default();
        assert!(state.last_update.is_none());
        state.ingest_frame("{}", now());
        assert_eq!(state.last_update, Some(now()));
    }

    #[test]
    fn duplicate_container_ids_are_kept() {
        let mut state = DashboardState::default();
        state.apply(
            ServerMessage::Snapshot(StatusSnapshot {
                containers: vec![
                    ContainerInfo {
                        id: "x".into(),
                        name: "one".into(),
                        status: ContainerStatus::Running,
                    },
                    ContainerInfo {
                        id: "x".into(),
                        name: "two".into(),
                        status: ContainerStatus::Exited,
                    },
                ],
                ..Default::default()
            }),
            now(),
        );
        assert_eq!(state.status.containers.len(), 2);
    }

    #[test]
    fn log_frames_append_in_arrival_order() {
        let mut state = DashboardState::default();
        state.ingest_frame(r#"{"type":"LOG","message":"first","severity":"success"}"#, now());
        state.ingest_frame(
            r#"{"type":"LOG","message":"second","severity":"error","timestamp":"2024-01-15T11:00:00Z","id":9}"#,
            now(),
        );

        assert_eq!(state.logs.count(), 2);
        let first = state.logs.at(0).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.timestamp, now());
        assert_eq!(first.severity, Severity::Success);
        let second = state.logs.at(1).unwrap();
        assert_eq!(second.id, 9);
        assert_eq!(second.severity, Severity::Error);
    }

    #[test]
    fn server_log_ids_never_repeat_or_rewind() {
        let mut state = DashboardState::default();
        state.system_log(Severity::Info, "a", now());
        state.system_log(Severity::Info, "b", now());
        state.ingest_frame(r#"{"type":"LOG","message":"srv","id":1}"#, now());
        state.ingest_frame(r#"{"type":"LOG","message":"ahead","id":10}"#, now());
        state.ingest_frame(r#"{"type":"LOG","message":"behind","id":4}"#, now());

        let ids: Vec<u64> = (0..state.logs.count())
            .map(|i| state.logs.at(i).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 10, 11]);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(state.logs.at(2).unwrap().message, "srv");
    }

    #[test]
    fn unknown_type_is_ignored_and_counted() {
        let mut state = DashboardState::default();
        let outcome = state.ingest_frame(r#"{"type":"PING"}"#, now());
        assert_eq!(outcome, FrameOutcome::Ignored { kind: "PING".into() });
        assert_eq!(state.diagnostics.ignored, 1);
        assert_eq!(state.diagnostics.applied, 0);
        assert!(state.diagnostics.last_error.is_none());
    }

    #[test]
    fn malformed_frame_is_dropped_and_recorded() {
        let mut state = DashboardState::default();
        state.ingest_frame(r#"{"type":"DEBUG_MESSAGES","data":["keep"]}"#, now());
        let outcome = state.ingest_frame("<html>502</html>", now());

        assert!(matches!(outcome, FrameOutcome::Dropped(FrameError::InvalidJson(_))));
        assert_eq!(state.diagnostics.malformed, 1);
        assert!(state.diagnostics.last_error.is_some());
        assert_eq!(state.debug_messages, vec!["keep".to_string()]);

        state.ingest_frame(r#"{"type":"DEBUG_MESSAGES","data":["next"]}"#, now());
        assert_eq!(state.debug_messages, vec!["next".to_string()]);
    }

    #[test]
    fn binary_frames_go_through_the_same_reducer() {
        let mut state = DashboardState::default();
        state.ingest_binary_frame(br#"{"type":"STATUS","connected":true}"#, now());
        assert_eq!(state.upstream_connected, Some(true));
    }

    #[test]
    fn system_log_prefixes_message() {
        let mut state = DashboardState::new(Some(10));
        state.system_log(Severity::Info, "Monitor service started.", now());
        assert_eq!(
            state.logs.at(0).unwrap().message,
            "[SYSTEM] Monitor service started."
        );
    }
}
