//! Application settings loaded from the process environment

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root configuration, read once at startup.
///
/// Everything comes from environment variables (a `.env` file is loaded
/// first when present): `MODELS`, `HOST`, `PORT`, `GATEWAY_MODE` and
/// `WEBHOOK_TIMEOUT_SECS`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `name=url;name=url;...` model-to-webhook mappings.
    ///
    /// Required in practice: an empty value fails model registry
    /// construction and the process refuses to start.
    #[serde(default)]
    pub models: String,

    /// Operating mode; `debug` raises the default log level.
    #[serde(default)]
    pub gateway_mode: GatewayMode,

    /// Upper bound on one full webhook exchange, in seconds.
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_timeout_secs() -> u64 {
    60
}

/// Operating mode selecting the default log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Debug,
    Release,
}

impl Default for GatewayMode {
    fn default() -> Self {
        GatewayMode::Release
    }
}

impl GatewayMode {
    /// Default tracing filter directive for this mode.
    ///
    /// `RUST_LOG` always wins when set; this only picks the fallback.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            GatewayMode::Debug => "debug",
            GatewayMode::Release => "info",
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            models: String::new(),
            gateway_mode: GatewayMode::default(),
            webhook_timeout_secs: default_webhook_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert!(settings.models.is_empty());
        assert_eq!(settings.gateway_mode, GatewayMode::Release);
        assert_eq!(settings.webhook_timeout_secs, 60);
    }

    #[test]
    fn test_bind_addr() {
        let settings = Settings {
            host: "127.0.0.1".to_string(),
            port: 9090,
            ..Default::default()
        };
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_mode_log_filter() {
        assert_eq!(GatewayMode::Debug.default_log_filter(), "debug");
        assert_eq!(GatewayMode::Release.default_log_filter(), "info");
    }

    #[test]
    fn test_mode_deserialization() {
        let mode: GatewayMode = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(mode, GatewayMode::Debug);
        let mode: GatewayMode = serde_json::from_str("\"release\"").unwrap();
        assert_eq!(mode, GatewayMode::Release);
    }
}
