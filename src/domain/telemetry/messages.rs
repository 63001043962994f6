//! Wire protocol between dashboards and the telemetry producer.
//!
//! Frames are JSON objects discriminated by a `type` field:
//! - Client → Server: `GET_DEBUG_MESSAGES`
//! - Server → Client: `STATUS`, `DEBUG_MESSAGES`, `LOG`, and the untyped
//!   whole-state status push of the monitor producer

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::foundation::Timestamp;

use super::logs::Severity;
use super::status::StatusSnapshot;

// ============================================
// Client → Server Messages
// ============================================

/// All message types the client can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Ask for the bulk debug message list.
    GetDebugMessages,
}

impl ClientMessage {
    /// Serialized frame text.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================
// Server → Client Messages
// ============================================

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Producer's own upstream connectivity (e.g. its database).
    Status { connected: bool },

    /// Complete debug message list, in display order.
    DebugMessages(Vec<String>),

    /// One incremental log line.
    Log(LogFrame),

    /// Untyped whole-state push from the monitor producer.
    Snapshot(StatusSnapshot),

    /// Well-formed frame with a `type` this client does not handle.
    Unknown { kind: String },
}

impl ServerMessage {
    /// Short label for diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::Status { .. } => "STATUS",
            ServerMessage::DebugMessages(_) => "DEBUG_MESSAGES",
            ServerMessage::Log(_) => "LOG",
            ServerMessage::Snapshot(_) => "SNAPSHOT",
            ServerMessage::Unknown { kind } => kind,
        }
    }
}

/// Payload of a `LOG` frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogFrame {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

/// Why an inbound frame was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("frame field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,
}

impl FrameError {
    fn invalid(field: &'static str, reason: impl ToString) -> Self {
        FrameError::InvalidField {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Decodes one text frame.
///
/// Frames without a `type` are treated as the monitor's whole-state push.
pub fn decode_frame(raw: &str) -> Result<ServerMessage, FrameError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| FrameError::InvalidJson(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(FrameError::NotAnObject);
    };

    let kind = match fields.remove("type") {
        None => return decode_snapshot(fields),
        Some(Value::String(kind)) => kind,
        Some(other) => {
            return Err(FrameError::invalid(
                "type",
                format!("expected string, got {}", other),
            ))
        }
    };

    match kind.as_str() {
        "STATUS" => {
            let connected = fields
                .get("connected")
                .ok_or(FrameError::MissingField("connected"))?
                .as_bool()
                .ok_or_else(|| FrameError::invalid("connected", "expected boolean"))?;
            Ok(ServerMessage::Status { connected })
        }
        "DEBUG_MESSAGES" => {
            let data = fields
                .remove("data")
                .ok_or(FrameError::MissingField("data"))?;
            let messages: Vec<String> =
                serde_json::from_value(data).map_err(|e| FrameError::invalid("data", e))?;
            Ok(ServerMessage::DebugMessages(messages))
        }
        "LOG" => {
            let frame: LogFrame = serde_json::from_value(Value::Object(fields))
                .map_err(|e| FrameError::invalid("log", e))?;
            Ok(ServerMessage::Log(frame))
        }
        _ => Ok(ServerMessage::Unknown { kind }),
    }
}

/// Decodes a binary frame as UTF-8 text.
pub fn decode_binary_frame(raw: &[u8]) -> Result<ServerMessage, FrameError> {
    let text = std::str::from_utf8(raw).map_err(|_| FrameError::InvalidUtf8)?;
    decode_frame(text)
}

fn decode_snapshot(fields: Map<String, Value>) -> Result<ServerMessage, FrameError> {
    serde_json::from_value(Value::Object(fields))
        .map(ServerMessage::Snapshot)
        .map_err(|e| FrameError::invalid("snapshot", e))
}
