//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Sources, later ones winning:
//!
//! 1. `.env` file if present
//! 2. An optional file named by `LIVE_STATUS_CONFIG` (toml, json, yaml, ...)
//! 3. Environment variables with the `LIVE_STATUS` prefix, `__` separating
//!    nested values
//!
//! # Example
//!
//! ```no_run
//! use live_status::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Connecting to {}", config.endpoint.ws_url().unwrap());
//! ```

mod endpoint;
mod error;
mod logging;
mod logs;
mod reconnect;

pub use endpoint::EndpointConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use logs::LogsConfig;
pub use reconnect::ReconnectConfig;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::application::SessionSettings;
use crate::domain::telemetry::DashboardKind;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "LIVE_STATUS_CONFIG";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a monitor
/// dashboard on `ws://localhost:10004/ws`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Which dashboard to drive
    #[serde(default)]
    pub dashboard: DashboardKind,

    /// Telemetry endpoint address
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Retry schedule after unplanned disconnects
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Log console retention and geometry
    #[serde(default)]
    pub logs: LogsConfig,

    /// Diagnostic logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, the optional config file and the
    /// environment
    ///
    /// # Environment Variable Format
    ///
    /// - `LIVE_STATUS__ENDPOINT__PORT=10004` -> `endpoint.port = 10004`
    /// - `LIVE_STATUS__RECONNECT__STRATEGY=exponential` -> `reconnect.strategy`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or values cannot be
    /// parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Load configuration from an explicit file (if any) plus the environment
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("LIVE_STATUS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.endpoint.validate()?;
        self.reconnect.validate()?;
        self.logs.validate()?;
        Ok(())
    }

    /// Settings for [`crate::application::spawn_session`]
    pub fn session_settings(&self) -> Result<SessionSettings, ValidationError> {
        Ok(SessionSettings::new(self.dashboard, self.endpoint.ws_url()?)
            .with_backoff(self.reconnect.backoff())
            .with_log_capacity(self.logs.capacity))
    }

    /// Validate all sections, then build the session settings
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` for the first invalid value.
    pub fn prepare_session(&self) -> Result<SessionSettings, ConfigError> {
        self.validate()?;
        Ok(self.session_settings()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::connection::BackoffStrategy;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "LIVE_STATUS__DASHBOARD",
        "LIVE_STATUS__ENDPOINT__PORT",
        "LIVE_STATUS__ENDPOINT__URL",
        "LIVE_STATUS__RECONNECT__STRATEGY",
        "LIVE_STATUS__RECONNECT__MAX_ATTEMPTS",
        "LIVE_STATUS__LOGS__CAPACITY",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load_from(None).unwrap();

        assert_eq!(config.dashboard, DashboardKind::Monitor);
        assert_eq!(
            config.endpoint.ws_url().unwrap().as_str(),
            "ws://localhost:10004/ws"
        );
        assert_eq!(config.reconnect.strategy, BackoffStrategy::Fixed);
        assert_eq!(config.reconnect.base_ms, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LIVE_STATUS__DASHBOARD", "debug");
        env::set_var("LIVE_STATUS__ENDPOINT__PORT", "10012");
        env::set_var("LIVE_STATUS__RECONNECT__STRATEGY", "exponential");
        env::set_var("LIVE_STATUS__RECONNECT__MAX_ATTEMPTS", "5");
        env::set_var("LIVE_STATUS__LOGS__CAPACITY", "1000");
        let result = AppConfig::load_from(None);
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.dashboard, DashboardKind::Debug);
        assert_eq!(config.endpoint.port, 10012);
        assert_eq!(config.reconnect.strategy, BackoffStrategy::Exponential);
        assert_eq!(config.reconnect.max_attempts, Some(5));
        assert_eq!(config.logs.capacity, Some(1000));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
dashboard = "debug"

[endpoint]
host = "monitor.internal"
port = 9000

[reconnect]
base_ms = 1500
"#
        )
        .unwrap();

        env::set_var("LIVE_STATUS__ENDPOINT__PORT", "9001");
        let result = AppConfig::load_from(Some(file.path()));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.dashboard, DashboardKind::Debug);
        assert_eq!(config.endpoint.host, "monitor.internal");
        assert_eq!(config.endpoint.port, 9001, "environment wins over file");
        assert_eq!(config.reconnect.base_ms, 1500);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_invalid_port_fails_to_parse() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LIVE_STATUS__ENDPOINT__PORT", "not-a-port");
        let result = AppConfig::load_from(None);
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = AppConfig {
            endpoint: EndpointConfig {
                url: Some("ftp://localhost".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.session_settings().is_err());
    }

    #[test]
    fn test_prepare_session_reports_validation_failure() {
        let config = AppConfig {
            reconnect: ReconnectConfig {
                base_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = config.prepare_session();
        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed(ValidationError::InvalidBackoff))
        ));
        assert!(AppConfig::default().prepare_session().is_ok());
    }

    #[test]
    fn test_session_settings() {
        let config = AppConfig {
            dashboard: DashboardKind::Debug,
            logs: LogsConfig {
                capacity: Some(200),
                ..Default::default()
            },
            ..Default::default()
        };
        let settings = config.session_settings().unwrap();

        assert_eq!(settings.kind, DashboardKind::Debug);
        assert_eq!(settings.endpoint.as_str(), "ws://localhost:10004/ws");
        assert_eq!(settings.backoff.delay_for(1), Duration::from_millis(3000));
        assert_eq!(settings.log_capacity, Some(200));
    }
}
