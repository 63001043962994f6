//! Diagnostic logging configuration

use serde::Deserialize;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Diagnostic logging (stderr), separate from the rendered dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` overrides it
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_level() -> String {
    "info,live_status=debug".to_string()
}
