//! Fuzz target for the batch export path.
//!
//! Arbitrary records, channel enablement and a failing channel go through
//! `export`; the report and the drained batch must always agree.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use user_events_logs::{
    ExportError, ExporterOptions, Level, LogRecord, MemoryProvider, Provider, UserEventsExporter,
};

#[derive(Debug, Arbitrary)]
struct FuzzRecord {
    severity: u8,
    body: String,
    event_name: Option<String>,
    attributes: Vec<(String, i64)>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    enabled_mask: u8,
    failing_level: Option<u8>,
    shutdown: bool,
    records: Vec<FuzzRecord>,
}

fuzz_target!(|input: FuzzInput| {
    let provider = MemoryProvider::open("fuzz").unwrap();
    let exporter = UserEventsExporter::with_provider(ExporterOptions::new("fuzz"), provider.clone());

    for (i, level) in Level::ALL.iter().enumerate() {
        exporter
            .registry()
            .handle(*level)
            .set_enabled(input.enabled_mask & (1 << i) != 0);
    }
    if let Some(idx) = input.failing_level {
        let level = Level::ALL[usize::from(idx) % Level::COUNT];
        exporter.registry().handle(level).fail_writes_with(-1);
    }
    if input.shutdown {
        exporter.shutdown_with_configured_timeout();
    }

    let mut batch: Vec<LogRecord> = input
        .records
        .iter()
        .map(|r| {
            let mut record = exporter.make_record();
            record.set_severity_number(r.severity).set_body(r.body.as_str());
            if let Some(name) = &r.event_name {
                record.set_event_name(name.as_str());
            }
            for (k, v) in &r.attributes {
                record.add_attribute(k.as_str(), *v);
            }
            record
        })
        .collect();
    let total = batch.len();

    match exporter.export(&mut batch) {
        Ok(report) => {
            assert!(batch.is_empty());
            assert_eq!(report.processed(), total);
            assert!(report.written <= provider.total_write_attempts());
        }
        Err(ExportError::Shutdown { records }) => {
            assert!(input.shutdown);
            assert_eq!(records, total);
            assert_eq!(batch.len(), total);
            assert_eq!(provider.total_write_attempts(), 0);
        }
        Err(ExportError::WriteFailed { position, written, .. }) => {
            assert!(position < total);
            assert!(written <= position);
            assert_eq!(batch.len(), total - position - 1);
        }
    }
});
