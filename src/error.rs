//! Error types for provider setup, configuration and export.

use thiserror::Error;

/// Failure to bring up the tracing provider. Fatal at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("invalid provider name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("tracing facility unavailable: {0}")]
    Unavailable(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that can occur while constructing an exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Batch-level export failure.
///
/// Unexportable records are never an error; they are counted in
/// [`ExportReport::skipped`](crate::exporter::ExportReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Export attempted after shutdown. No record was touched.
    #[error("exporting {records} log(s) failed, exporter is shutdown")]
    Shutdown { records: usize },

    /// The tracing facility rejected a write. Records before `position`
    /// were already emitted and are not rolled back.
    #[error("write to {channel} failed with error code {code} (record {position}, {written} already written)")]
    WriteFailed {
        code: i32,
        position: usize,
        written: usize,
        channel: String,
    },
}

impl ExportError {
    /// Short label used for the failure metric.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Shutdown { .. } => "shutdown",
            Self::WriteFailed { .. } => "write_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_message_mentions_count() {
        let err = ExportError::Shutdown { records: 3 };
        assert!(err.to_string().contains("3 log(s)"));
        assert_eq!(err.reason(), "shutdown");
    }

    #[test]
    fn write_failure_message_carries_code() {
        let err = ExportError::WriteFailed {
            code: -22,
            position: 1,
            written: 1,
            channel: "p_L2K1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("-22"));
        assert!(msg.contains("p_L2K1"));
    }
}
