//! Application configuration.
//!
//! Built-in defaults, optionally overridden by a TOML file passed with
//! `--config`. Missing keys keep their defaults. The configuration is
//! validated once at load time; commands never see an invalid one.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`AppConfig`].
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        /// File path.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Newline-delimited JSON events.
    Json,
    /// Human-readable multi-line events.
    Pretty,
}

/// Where the remote-procedure handle points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Base address of the procedure server.
    pub address: String,
    /// Service name the handle is bound to.
    pub service: String,
    /// Method name invoked on the service.
    pub method: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:50051".to_string(),
            service: "AuthService".to_string(),
            method: fetch::MethodName::CONVENTIONAL.to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used as the OpenTelemetry service name.
    pub app_name: String,
    /// Application version.
    pub app_version: String,
    /// Base URL every API endpoint is derived from.
    pub api_base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Log output format.
    pub log_format: LogFormat,
    /// OTLP collector endpoint; tracing export is disabled when unset.
    pub otlp_endpoint: Option<String>,
    /// Remote-procedure handle settings.
    pub rpc: RpcConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "MyApp".to_string(),
            app_version: "1.0.0".to_string(),
            api_base_url: "https://api.example.com".to_string(),
            timeout_ms: 5000,
            log_format: LogFormat::Pretty,
            otlp_endpoint: None,
            rpc: RpcConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `path` if given, otherwise returns the defaults. Either way the
    /// result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                let display = path.display().to_string();
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: display.clone(),
                    source,
                })?;
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: display,
                    source,
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be greater than zero".into()));
        }
        if fetch::MethodName::new(self.rpc.method.clone()).is_none() {
            return Err(ConfigError::Invalid("rpc.method must not be empty".into()));
        }
        Ok(())
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    /// `{base}/auth/login`
    pub fn login_endpoint(&self) -> String {
        self.endpoint("/auth/login")
    }

    /// `{base}/auth/register`
    pub fn register_endpoint(&self) -> String {
        self.endpoint("/auth/register")
    }

    /// `{base}/user/profile`
    pub fn user_profile_endpoint(&self) -> String {
        self.endpoint("/user/profile")
    }
}
