//! Internal diagnostics for the exporter.
//!
//! Structured logging goes through `tracing`; counters go through the
//! `metrics` facade. Neither installs anything unless the host asks.

mod logging;
pub mod metrics;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
