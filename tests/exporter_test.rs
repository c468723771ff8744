//! Integration tests for the batch emission path.

use std::time::Duration;

use user_events_logs::record::event::FieldValue;
use user_events_logs::{
    ExportError, ExportReport, ExporterOptions, Level, LogRecord, MemoryProvider, Provider,
    Recordable, TraceChannel, TraceEvent, UserEventsExporter, WRITE_OK,
};

const PROVIDER: &str = "myprovider";

fn setup() -> (UserEventsExporter<MemoryProvider>, MemoryProvider) {
    let provider = MemoryProvider::open(PROVIDER).unwrap();
    let exporter = UserEventsExporter::with_provider(ExporterOptions::new(PROVIDER), provider.clone());
    (exporter, provider)
}

fn record(level: Level, body: &str) -> LogRecord {
    let mut r = LogRecord::new();
    r.set_level(level).set_body(body);
    r
}

/// Record with a scripted outcome, for driving the exporter without the
/// real encoder.
struct ScriptedRecord {
    level: Level,
    exportable: bool,
    fail_with: Option<i32>,
    attempted: bool,
}

impl ScriptedRecord {
    fn ok(level: Level) -> Self {
        Self {
            level,
            exportable: true,
            fail_with: None,
            attempted: false,
        }
    }

    fn failing(level: Level, code: i32) -> Self {
        Self {
            fail_with: Some(code),
            ..Self::ok(level)
        }
    }

    fn unexportable(level: Level) -> Self {
        Self {
            exportable: false,
            ..Self::ok(level)
        }
    }
}

impl Recordable for ScriptedRecord {
    fn prepare(&mut self) -> bool {
        self.exportable
    }

    fn level(&self) -> Level {
        self.level
    }

    fn write_to(&mut self, channel: &dyn TraceChannel) -> i32 {
        self.attempted = true;
        let mut event = TraceEvent::new();
        event.reset("Scripted", self.level);
        let status = channel.write(&event);
        self.fail_with.unwrap_or(status)
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_one_channel_per_level() {
    let (exporter, provider) = setup();
    assert_eq!(provider.channels().len(), Level::COUNT);

    for level in Level::ALL {
        let channel = exporter.registry().resolve(level);
        assert_eq!(channel.name(), level.channel_name(PROVIDER));
        assert!(!channel.enabled());
    }
}

#[test]
fn test_invalid_provider_name_fails_construction() {
    let result = UserEventsExporter::<MemoryProvider>::new(ExporterOptions::new("has space"));
    assert!(result.is_err());

    let result = UserEventsExporter::<MemoryProvider>::new(ExporterOptions::new(""));
    assert!(result.is_err());
}

// ============================================================================
// Listening gate
// ============================================================================

#[test]
fn test_no_listener_then_error_listener_then_shutdown() {
    let (exporter, provider) = setup();

    let mut batch = vec![
        record(Level::Informational, "started"),
        record(Level::Error, "payment declined"),
        record(Level::Warning, "slow response"),
    ];
    let report = exporter.export(&mut batch).unwrap();
    assert_eq!(report.not_listening, 3);
    assert_eq!(report.written, 0);
    assert_eq!(provider.total_write_attempts(), 0);
    assert!(batch.is_empty());

    assert!(provider.set_enabled(&Level::Error.channel_name(PROVIDER), true));
    let mut batch = vec![
        record(Level::Informational, "started"),
        record(Level::Error, "payment declined"),
        record(Level::Warning, "slow response"),
    ];
    let report = exporter.export(&mut batch).unwrap();
    assert_eq!(
        report,
        ExportReport {
            written: 1,
            not_listening: 2,
            skipped: 0
        }
    );

    let error_channel = exporter.registry().handle(Level::Error);
    assert_eq!(error_channel.event_count(), 1);
    assert_eq!(provider.total_write_attempts(), 1);

    let event = &error_channel.events()[0];
    assert_eq!(event.level(), Level::Error);
    assert_eq!(event.field("body"), Some(&FieldValue::Str("payment declined".into())));

    assert!(exporter.shutdown(Duration::from_secs(5)));
    let mut batch = vec![
        record(Level::Error, "a"),
        record(Level::Error, "b"),
        record(Level::Error, "c"),
    ];
    let result = exporter.export(&mut batch);
    assert_eq!(result, Err(ExportError::Shutdown { records: 3 }));
    assert_eq!(batch.len(), 3);
    assert_eq!(provider.total_write_attempts(), 1);
}

#[test]
fn test_enabled_flag_is_read_per_record() {
    let (exporter, provider) = setup();
    let name = Level::Warning.channel_name(PROVIDER);

    provider.set_enabled(&name, true);
    let mut batch = vec![record(Level::Warning, "one")];
    assert_eq!(exporter.export(&mut batch).unwrap().written, 1);

    provider.set_enabled(&name, false);
    let mut batch = vec![record(Level::Warning, "two")];
    assert_eq!(exporter.export(&mut batch).unwrap().not_listening, 1);

    assert_eq!(provider.channel(&name).unwrap().event_count(), 1);
}

#[test]
fn test_records_route_to_their_own_level() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);

    let mut batch: Vec<LogRecord> = Level::ALL
        .iter()
        .map(|level| record(*level, level.as_str()))
        .collect();
    assert_eq!(exporter.export(&mut batch).unwrap().written, Level::COUNT);

    for level in Level::ALL {
        let channel = exporter.registry().handle(level);
        assert_eq!(channel.event_count(), 1, "level {}", level);
        assert_eq!(channel.events()[0].level(), level);
    }
}

// ============================================================================
// Batch outcomes
// ============================================================================

#[test]
fn test_empty_batch_succeeds() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);
    let mut batch: Vec<LogRecord> = Vec::new();
    assert_eq!(exporter.export(&mut batch), Ok(ExportReport::default()));
}

#[test]
fn test_empty_batch_after_shutdown_fails() {
    let (exporter, _) = setup();
    exporter.shutdown(Duration::ZERO);
    let mut batch: Vec<LogRecord> = Vec::new();
    assert_eq!(
        exporter.export(&mut batch),
        Err(ExportError::Shutdown { records: 0 })
    );
}

#[test]
fn test_unexportable_records_are_skipped() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);

    let mut no_severity = LogRecord::new();
    no_severity.set_body("missing severity");

    let mut batch = vec![
        record(Level::Error, "first"),
        no_severity,
        record(Level::Error, "third"),
    ];
    let report = exporter.export(&mut batch).unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.processed(), 3);
    assert_eq!(exporter.registry().handle(Level::Error).event_count(), 2);
}

#[test]
fn test_scripted_skip_does_not_touch_channel() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);

    let mut batch = vec![
        ScriptedRecord::unexportable(Level::Critical),
        ScriptedRecord::ok(Level::Critical),
    ];
    let report = exporter.export(&mut batch).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, 1);
    assert_eq!(provider.total_write_attempts(), 1);
}

#[test]
fn test_write_failure_stops_batch() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);

    let mut batch = vec![
        ScriptedRecord::ok(Level::Informational),
        ScriptedRecord::ok(Level::Warning),
        ScriptedRecord::failing(Level::Error, 28),
        ScriptedRecord::ok(Level::Error),
        ScriptedRecord::ok(Level::Critical),
    ];

    let err = exporter.export(&mut batch).unwrap_err();
    assert_eq!(
        err,
        ExportError::WriteFailed {
            code: 28,
            position: 2,
            written: 2,
            channel: Level::Error.channel_name(PROVIDER),
        }
    );

    // The two records after the failure stay with the caller, unattempted.
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|r| !r.attempted));
    assert_eq!(batch[0].level, Level::Error);
    assert_eq!(batch[1].level, Level::Critical);

    // Writes before the failure are not rolled back.
    assert_eq!(provider.total_write_attempts(), 3);
    assert_eq!(exporter.registry().handle(Level::Critical).write_attempts(), 0);
}

#[test]
fn test_channel_failure_code_is_reported() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);
    exporter.registry().handle(Level::Warning).fail_writes_with(-5);

    let mut batch = vec![
        record(Level::Warning, "dropped"),
        record(Level::Informational, "never reached"),
    ];
    match exporter.export(&mut batch) {
        Err(ExportError::WriteFailed { code, position, written, .. }) => {
            assert_eq!(code, -5);
            assert_eq!(position, 0);
            assert_eq!(written, 0);
        }
        other => panic!("expected write failure, got {:?}", other),
    }
    assert_eq!(batch.len(), 1);
    assert_eq!(exporter.registry().handle(Level::Informational).write_attempts(), 0);
}

#[test]
fn test_boxed_records_are_exportable() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);

    let mut batch: Vec<Box<dyn Recordable>> = vec![
        Box::new(record(Level::Error, "boxed")),
        Box::new(ScriptedRecord::ok(Level::Verbose)),
    ];
    let report = exporter.export(&mut batch).unwrap();
    assert_eq!(report.written, 2);
}

#[test]
fn test_written_record_is_not_exported_twice() {
    let (exporter, provider) = setup();
    provider.set_all_enabled(true);

    let mut r = record(Level::Error, "once");
    let channel = exporter.registry().handle(Level::Error);
    assert!(r.prepare());
    assert_eq!(r.write_to(&*channel), WRITE_OK);
    assert!(r.is_written());

    let mut batch = vec![r];
    let report = exporter.export(&mut batch).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(channel.event_count(), 1);
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn test_shutdown_is_idempotent_and_permanent() {
    let (exporter, _) = setup();
    assert!(!exporter.is_shutdown());
    assert!(exporter.shutdown(Duration::from_millis(10)));
    assert!(exporter.shutdown(Duration::from_millis(10)));
    assert!(exporter.is_shutdown());
    assert!(exporter.status().shutdown);

    for _ in 0..3 {
        let mut batch = vec![record(Level::Error, "late")];
        assert!(exporter.export(&mut batch).is_err());
        assert_eq!(batch.len(), 1);
    }
}

#[test]
fn test_configured_timeout_drives_shutdown() {
    let provider = MemoryProvider::open(PROVIDER).unwrap();
    let options = ExporterOptions::from_toml_str(
        "provider_name = \"myprovider\"\nshutdown_timeout_ms = 250",
    )
    .unwrap();
    assert_eq!(options.shutdown_timeout(), Duration::from_millis(250));

    let exporter = UserEventsExporter::with_provider(options, provider);
    assert!(exporter.shutdown_with_configured_timeout());
    assert!(exporter.is_shutdown());

    let mut batch = vec![record(Level::Error, "late")];
    assert_eq!(
        exporter.export(&mut batch),
        Err(ExportError::Shutdown { records: 1 })
    );
}

#[test]
fn test_provider_name_wins_over_options() {
    let provider = MemoryProvider::open("actual_name").unwrap();
    let exporter =
        UserEventsExporter::with_provider(ExporterOptions::new("configured_name"), provider);

    assert_eq!(exporter.options().provider_name, "actual_name");
    assert_eq!(exporter.status().provider_name, "actual_name");
    for level in Level::ALL {
        assert_eq!(
            exporter.registry().resolve(level).name(),
            level.channel_name("actual_name")
        );
    }
}
