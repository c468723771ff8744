//! Subscriber setup for the exporter's own diagnostics.
//!
//! One formatting layer (JSON or pretty) over one writer (stderr or an
//! append-mode file), filtered by an `EnvFilter` directive string.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Output format of diagnostic lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(LogError::InvalidFormat(other.to_string())),
        }
    }
}

/// Where and how diagnostics are written.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `warn` or `user_events_logs=debug`.
    pub level: String,
    /// Append to this file instead of stderr.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "warn".to_string(),
            output_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),
    #[error("Failed to open log file {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

fn open_writer(path: Option<&Path>) -> Result<BoxMakeWriter, LogError> {
    let Some(path) = path else {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::FileOpen {
            path: path.display().to_string(),
            source,
        })?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

/// Build the formatting layer without installing it.
fn build_layer(config: &LogConfig) -> Result<Box<dyn Layer<Registry> + Send + Sync>, LogError> {
    let to_file = config.output_path.is_some();
    let writer = open_writer(config.output_path.as_deref())?;
    let layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(!to_file)
            .with_writer(writer)
            .boxed(),
    };
    Ok(layer)
}

/// Install the global subscriber described by `config`.
///
/// Call once at startup. Hosts that already own a subscriber should skip
/// this; the exporter only emits through the `tracing` macros.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;
    let layer = build_layer(config)?;

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|_| LogError::AlreadyInitialized)
}
