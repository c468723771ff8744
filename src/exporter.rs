//! The emission path: route each record to its level's tracepoint and write
//! it only if a consumer is attached.
//!
//! Export is synchronous and runs on the caller's thread. Records are
//! processed in order and the first failed write aborts the batch; writes
//! that already happened are not undone.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, trace};

use crate::config::ExporterOptions;
use crate::error::{ExportError, ExporterError};
use crate::lifecycle::LifecycleGuard;
use crate::provider::{Provider, TraceChannel, WRITE_OK};
use crate::record::{LogRecord, Recordable};
use crate::registry::ChannelRegistry;
use crate::severity::Level;
use crate::telemetry::metrics;

/// Per-batch counts returned by a successful export.
///
/// `not_listening` and `written` both count as success; they are kept apart
/// so callers can see how much encoding was avoided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Records encoded and written to a tracepoint.
    pub written: usize,
    /// Records whose channel had no consumer; nothing was encoded.
    pub not_listening: usize,
    /// Records that failed to prepare and were dropped.
    pub skipped: usize,
}

impl ExportReport {
    pub fn processed(&self) -> usize {
        self.written + self.not_listening + self.skipped
    }
}

enum Emission {
    Skipped,
    NotListening,
    Written,
    Failed { code: i32, channel: String },
}

/// Listening state of a single level's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub level: Level,
    pub tracepoint: String,
    pub enabled: bool,
}

/// Point-in-time snapshot of the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExporterStatus {
    pub provider_name: String,
    pub shutdown: bool,
    pub channels: Vec<ChannelStatus>,
}

/// Log exporter writing records to per-level tracepoint channels.
///
/// `export` and `shutdown` may be called from different threads. Shutdown
/// only latches a flag: an export that passed the flag check before the
/// latch finishes its writes, including any in flight.
pub struct UserEventsExporter<P: Provider> {
    options: ExporterOptions,
    provider: P,
    registry: ChannelRegistry<P::Channel>,
    lifecycle: LifecycleGuard,
}

impl<P: Provider> UserEventsExporter<P> {
    /// Open a provider named by `options` and register every level's
    /// channel.
    pub fn new(options: ExporterOptions) -> Result<Self, ExporterError> {
        let provider = P::open(&options.provider_name)?;
        Ok(Self::with_provider(options, provider))
    }

    /// Build on an already opened provider. The provider's name wins over
    /// `options.provider_name`, since it is the one the channels carry.
    pub fn with_provider(mut options: ExporterOptions, provider: P) -> Self {
        if options.provider_name != provider.name() {
            debug!(
                configured = %options.provider_name,
                provider = provider.name(),
                "provider name differs from options, using the provider's"
            );
            options.provider_name = provider.name().to_string();
        }
        let registry = ChannelRegistry::new(&provider);
        debug!(
            provider = provider.name(),
            channels = Level::COUNT,
            "registered tracepoint channels"
        );
        Self {
            options,
            provider,
            registry,
            lifecycle: LifecycleGuard::new(),
        }
    }

    /// Empty record for upstream code to populate.
    pub fn make_record(&self) -> LogRecord {
        LogRecord::new()
    }

    /// Whether a consumer is attached for `level`. Lets producers skip
    /// building records nobody will read.
    #[inline]
    pub fn is_listening(&self, level: Level) -> bool {
        self.registry.resolve(level).enabled()
    }

    /// Export a batch.
    ///
    /// After shutdown this fails with [`ExportError::Shutdown`] and leaves
    /// `batch` untouched. Otherwise each record is prepared, routed and,
    /// if its channel is enabled, written. Every attempted record is drained
    /// from `batch`. On a write failure the failing record is drained too,
    /// and the records after it stay in `batch` unattempted.
    pub fn export<R: Recordable>(&self, batch: &mut Vec<R>) -> Result<ExportReport, ExportError> {
        if self.lifecycle.is_shutdown() {
            let err = ExportError::Shutdown {
                records: batch.len(),
            };
            error!(records = batch.len(), "[user_events log exporter] {}", err);
            metrics::record_failure(&err);
            return Err(err);
        }

        let mut report = ExportReport::default();
        let mut consumed = 0;
        let mut failure = None;

        for record in batch.iter_mut() {
            consumed += 1;
            match self.emit(record) {
                Emission::Skipped => report.skipped += 1,
                Emission::NotListening => report.not_listening += 1,
                Emission::Written => report.written += 1,
                Emission::Failed { code, channel } => {
                    error!(
                        code,
                        position = consumed - 1,
                        tracepoint = %channel,
                        "[user_events log exporter] exporting failed, error code: {}",
                        code
                    );
                    failure = Some(ExportError::WriteFailed {
                        code,
                        position: consumed - 1,
                        written: report.written,
                        channel,
                    });
                    break;
                }
            }
        }

        batch.drain(..consumed);
        metrics::record_batch(&report);

        if let Some(err) = failure {
            metrics::record_failure(&err);
            return Err(err);
        }

        trace!(
            written = report.written,
            not_listening = report.not_listening,
            skipped = report.skipped,
            "batch exported"
        );
        Ok(report)
    }

    fn emit<R: Recordable>(&self, record: &mut R) -> Emission {
        if !record.prepare() {
            return Emission::Skipped;
        }

        let channel = self.registry.resolve(record.level());
        if !channel.enabled() {
            return Emission::NotListening;
        }

        match record.write_to(channel) {
            WRITE_OK => Emission::Written,
            code => Emission::Failed {
                code,
                channel: channel.name().to_string(),
            },
        }
    }

    /// Latch the shutdown flag. Nothing is buffered, so nothing is drained
    /// and `timeout` only bounds an operation that never waits. Always
    /// returns true.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if self.lifecycle.shutdown_first() {
            info!(
                provider = self.provider.name(),
                timeout_ms = timeout.as_millis() as u64,
                "user_events log exporter shut down"
            );
        }
        true
    }

    /// [`shutdown`](Self::shutdown) with the timeout from
    /// [`ExporterOptions::shutdown_timeout`].
    pub fn shutdown_with_configured_timeout(&self) -> bool {
        self.shutdown(self.options.shutdown_timeout())
    }

    pub fn is_shutdown(&self) -> bool {
        self.lifecycle.is_shutdown()
    }

    pub fn status(&self) -> ExporterStatus {
        ExporterStatus {
            provider_name: self.provider.name().to_string(),
            shutdown: self.is_shutdown(),
            channels: self
                .registry
                .iter()
                .map(|(level, channel)| ChannelStatus {
                    level,
                    tracepoint: channel.name().to_string(),
                    enabled: channel.enabled(),
                })
                .collect(),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry<P::Channel> {
        &self.registry
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn options(&self) -> &ExporterOptions {
        &self.options
    }
}
