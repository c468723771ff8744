//! user_events log exporter
//!
//! Emits finalized log records as OS trace events, one tracepoint channel
//! per severity level, and only pays the encoding cost when a consumer is
//! attached to the record's channel.
//!
//! # Components
//!
//! - [`registry::ChannelRegistry`]: fixed level → channel table, built once
//! - [`lifecycle::LifecycleGuard`]: one-way shutdown latch
//! - [`exporter::UserEventsExporter`]: per-batch emission path
//! - [`record::Recordable`]: what the emission path needs from a record
//! - [`provider::Provider`]: registration and enablement primitives
//! - [`record::event::TraceEvent`]: typed field list handed to a channel
//!
//! On Linux, `UserEventsProvider` registers real tracepoints through
//! EventHeader. `MemoryProvider` keeps events in process and backs the
//! CLI dry run and the tests.
//!
//! # Example
//!
//! ```
//! use user_events_logs::{ExporterOptions, Level, MemoryProvider, UserEventsExporter};
//!
//! let exporter: UserEventsExporter<MemoryProvider> =
//!     UserEventsExporter::new(ExporterOptions::new("my_service")).unwrap();
//!
//! let mut record = exporter.make_record();
//! record.set_level(Level::Error).set_body("payment declined");
//!
//! let report = exporter.export(&mut vec![record]).unwrap();
//! assert_eq!(report.not_listening, 1); // no consumer attached yet
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod lifecycle;
pub mod provider;
pub mod record;
pub mod registry;
pub mod severity;
pub mod telemetry;

pub use config::ExporterOptions;
pub use error::{ConfigError, ExportError, ExporterError, ProviderError};
pub use exporter::{ChannelStatus, ExportReport, ExporterStatus, UserEventsExporter};
pub use lifecycle::LifecycleGuard;
pub use provider::{MemoryChannel, MemoryProvider, Provider, TraceChannel, WRITE_OK};
#[cfg(target_os = "linux")]
pub use provider::{UserEventsChannel, UserEventsProvider};
pub use record::event::TraceEvent;
pub use record::{AnyValue, LogRecord, Recordable, TraceContext};
pub use registry::{ChannelRegistry, ENCODING_VERSION};
pub use severity::Level;
