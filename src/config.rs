//! Exporter configuration loading from environment variables and TOML.
//!
//! Environment values fall back to defaults when missing or invalid; the
//! provider name itself is validated when the provider is opened.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `USER_EVENTS_PROVIDER_NAME` | opentelemetry_logs | Provider / tracepoint prefix |
//! | `USER_EVENTS_SHUTDOWN_TIMEOUT_MS` | 5000 | Timeout passed to `shutdown` |
//! | `USER_EVENTS_LOG_LEVEL` | warn | Filter for the exporter's own logs |
//! | `USER_EVENTS_LOG_FORMAT` | json | `json` or `pretty` |
//! | `USER_EVENTS_LOG_FILE` | (stderr) | Append diagnostics to this file |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::severity::Level;
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_PROVIDER_NAME: &str = "opentelemetry_logs";
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// Options the exporter is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterOptions {
    pub provider_name: String,
    pub shutdown_timeout_ms: u64,
}

impl Default for ExporterOptions {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

impl ExporterOptions {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            ..Self::default()
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Parse options from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub provider_name: String,
    pub shutdown_timeout_ms: u64,
    pub log_level: String,
    pub log_format: &'static str,
    pub log_file: Option<String>,
    pub tracepoints: Vec<String>,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub exporter: ExporterOptions,
    pub logging: LogConfig,
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Read a string env var, treating empty as missing.
fn parse_string(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Read an optional path env var, treating empty as unset.
fn parse_path(key: &str) -> Option<PathBuf> {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => Some(PathBuf::from(val.trim())),
        _ => None,
    }
}

fn load_exporter_options() -> ExporterOptions {
    ExporterOptions {
        provider_name: parse_string("USER_EVENTS_PROVIDER_NAME", DEFAULT_PROVIDER_NAME),
        shutdown_timeout_ms: parse_u64("USER_EVENTS_SHUTDOWN_TIMEOUT_MS", DEFAULT_SHUTDOWN_TIMEOUT_MS),
    }
}

fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let format = std::env::var("USER_EVENTS_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or(defaults.format);
    LogConfig {
        format,
        level: parse_string("USER_EVENTS_LOG_LEVEL", &defaults.level),
        output_path: parse_path("USER_EVENTS_LOG_FILE"),
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        exporter: load_exporter_options(),
        logging: load_log_config(),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            provider_name: self.exporter.provider_name.clone(),
            shutdown_timeout_ms: self.exporter.shutdown_timeout_ms,
            log_level: self.logging.level.clone(),
            log_format: self.logging.format.as_str(),
            log_file: self
                .logging
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            tracepoints: Level::ALL
                .iter()
                .map(|level| level.channel_name(&self.exporter.provider_name))
                .collect(),
        }
    }
}
