//! Export counters published through the `metrics` facade.
//!
//! Counters are bumped once per batch from the aggregated report, never per
//! record. Without an installed recorder these calls are no-ops.

use metrics::{counter, describe_counter, Unit};

use crate::error::ExportError;
use crate::exporter::ExportReport;

pub const RECORDS_WRITTEN: &str = "user_events_records_written_total";
pub const RECORDS_NOT_LISTENING: &str = "user_events_records_not_listening_total";
pub const RECORDS_SKIPPED: &str = "user_events_records_skipped_total";
pub const RECORDS_REJECTED: &str = "user_events_records_rejected_total";
pub const EXPORT_FAILURES: &str = "user_events_export_failures_total";

/// Register descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(RECORDS_WRITTEN, Unit::Count, "Records written to a tracepoint");
    describe_counter!(
        RECORDS_NOT_LISTENING,
        Unit::Count,
        "Records dropped because no consumer was attached"
    );
    describe_counter!(RECORDS_SKIPPED, Unit::Count, "Records that failed to prepare");
    describe_counter!(
        RECORDS_REJECTED,
        Unit::Count,
        "Records refused because the exporter was shut down"
    );
    describe_counter!(EXPORT_FAILURES, Unit::Count, "Export calls that returned an error");
}

/// Record the counts of a completed or aborted batch.
pub fn record_batch(report: &ExportReport) {
    if report.written > 0 {
        counter!(RECORDS_WRITTEN).increment(report.written as u64);
    }
    if report.not_listening > 0 {
        counter!(RECORDS_NOT_LISTENING).increment(report.not_listening as u64);
    }
    if report.skipped > 0 {
        counter!(RECORDS_SKIPPED).increment(report.skipped as u64);
    }
}

/// Record a failed export call.
pub fn record_failure(error: &ExportError) {
    counter!(EXPORT_FAILURES, "reason" => error.reason()).increment(1);
    if let ExportError::Shutdown { records } = error {
        counter!(RECORDS_REJECTED).increment(*records as u64);
    }
}
