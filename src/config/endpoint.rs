//! Telemetry endpoint configuration

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;

/// Where the dashboard connects.
///
/// `url` wins when set; otherwise the address is built from the parts.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Full endpoint address; `http(s)://` is accepted and rewritten
    pub url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_path")]
    pub path: String,

    /// Use `wss://` instead of `ws://`
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl EndpointConfig {
    /// Resolved WebSocket address.
    pub fn ws_url(&self) -> Result<Url, ValidationError> {
        match &self.url {
            Some(raw) => normalize_url(raw),
            None => {
                let scheme = if self.secure { "wss" } else { "ws" };
                let raw = format!("{}://{}:{}{}", scheme, self.host, self.port, self.path);
                Url::parse(&raw)
                    .map_err(|e| ValidationError::InvalidEndpointUrl(raw, e.to_string()))
            }
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Validate endpoint configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_none() {
            if self.port == 0 {
                return Err(ValidationError::InvalidPort);
            }
            if self.host.trim().is_empty() {
                return Err(ValidationError::EmptyHost);
            }
            if !self.path.starts_with('/') {
                return Err(ValidationError::InvalidPath);
            }
        }
        if self.connect_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.ws_url().map(|_| ())
    }
}

/// `http(s)` becomes `ws(s)`; a bare origin gets `/ws`.
fn normalize_url(raw: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidEndpointUrl(raw.to_string(), reason.to_string());

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("scheme must be ws, wss, http or https")),
    };
    if url.scheme() != scheme {
        url.set_scheme(scheme)
            .map_err(|_| invalid("cannot switch scheme"))?;
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/ws");
    }
    Ok(url)
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            path: default_path(),
            secure: false,
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    10004
}

fn default_path() -> String {
    "/ws".to_string()
}

fn default_connect_timeout() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> EndpointConfig {
        EndpointConfig {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.ws_url().unwrap().as_str(), "ws://localhost:10004/ws");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secure_uses_wss() {
        let config = EndpointConfig {
            secure: true,
            host: "monitor.internal".to_string(),
            port: 443,
            ..Default::default()
        };
        assert_eq!(config.ws_url().unwrap().as_str(), "wss://monitor.internal/ws");
    }

    #[test]
    fn test_http_url_is_rewritten() {
        assert_eq!(
            with_url("http://localhost:10004").ws_url().unwrap().as_str(),
            "ws://localhost:10004/ws"
        );
        assert_eq!(
            with_url("https://example.com").ws_url().unwrap().as_str(),
            "wss://example.com/ws"
        );
    }

    #[test]
    fn test_explicit_path_is_kept() {
        assert_eq!(
            with_url("ws://localhost:9000/live").ws_url().unwrap().as_str(),
            "ws://localhost:9000/live"
        );
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        assert!(matches!(
            with_url("ftp://localhost").validate(),
            Err(ValidationError::InvalidEndpointUrl(..))
        ));
        assert!(matches!(
            with_url("not a url").validate(),
            Err(ValidationError::InvalidEndpointUrl(..))
        ));
    }

    #[test]
    fn test_invalid_parts_rejected() {
        let config = EndpointConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let config = EndpointConfig {
            host: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyHost));

        let config = EndpointConfig {
            path: "ws".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPath));

        let config = EndpointConfig {
            connect_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }
}
