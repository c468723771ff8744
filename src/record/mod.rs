//! Records handed to the exporter.
//!
//! [`Recordable`] is the narrow capability the emission path needs from a
//! record: prepare, report a level, encode-and-write. [`LogRecord`] is the
//! concrete record this crate hands out.

pub mod event;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::TraceChannel;
use crate::severity::{default_severity_text, Level};
use event::TraceEvent;

/// Event name used when a record does not set one.
pub const DEFAULT_EVENT_NAME: &str = "Log";

/// A record the exporter can emit.
pub trait Recordable {
    /// Finalize the record for export. Returning false means the record is
    /// not exportable and is skipped without failing the batch.
    fn prepare(&mut self) -> bool;

    /// Level used to pick the channel. Only meaningful after a successful
    /// [`prepare`](Recordable::prepare).
    fn level(&self) -> Level;

    /// Encode the record and write it to `channel`. Returns the channel's
    /// status code (0 = success).
    fn write_to(&mut self, channel: &dyn TraceChannel) -> i32;
}

impl<R: Recordable + ?Sized> Recordable for Box<R> {
    fn prepare(&mut self) -> bool {
        (**self).prepare()
    }

    fn level(&self) -> Level {
        (**self).level()
    }

    fn write_to(&mut self, channel: &dyn TraceChannel) -> i32 {
        (**self).write_to(channel)
    }
}

/// Attribute or body value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl From<bool> for AnyValue {
    fn from(v: bool) -> Self {
        AnyValue::Bool(v)
    }
}

impl From<i64> for AnyValue {
    fn from(v: i64) -> Self {
        AnyValue::Int(v)
    }
}

impl From<f64> for AnyValue {
    fn from(v: f64) -> Self {
        AnyValue::Double(v)
    }
}

impl From<&str> for AnyValue {
    fn from(v: &str) -> Self {
        AnyValue::String(v.to_string())
    }
}

impl From<String> for AnyValue {
    fn from(v: String) -> Self {
        AnyValue::String(v)
    }
}

impl From<Vec<u8>> for AnyValue {
    fn from(v: Vec<u8>) -> Self {
        AnyValue::Bytes(v)
    }
}

/// Trace correlation carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: [u8; 16],
    pub span_id: [u8; 8],
    pub trace_flags: u8,
}

/// Structured log record.
///
/// Single use: once written it refuses to prepare again.
#[derive(Debug, Clone, Default)]
pub struct LogRecord {
    timestamp: Option<DateTime<Utc>>,
    observed_timestamp: Option<DateTime<Utc>>,
    severity_number: u8,
    severity_text: Option<String>,
    body: Option<AnyValue>,
    event_name: Option<String>,
    scope: Option<String>,
    trace_context: Option<TraceContext>,
    attributes: Vec<(String, AnyValue)>,
    level: Option<Level>,
    written: bool,
    event: TraceEvent,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn set_observed_timestamp(&mut self, timestamp: DateTime<Utc>) -> &mut Self {
        self.observed_timestamp = Some(timestamp);
        self
    }

    /// OpenTelemetry severity number, 1..=24.
    pub fn set_severity_number(&mut self, number: u8) -> &mut Self {
        self.severity_number = number;
        self
    }

    /// Shorthand for the canonical severity number of `level`.
    pub fn set_level(&mut self, level: Level) -> &mut Self {
        self.set_severity_number(level.canonical_severity_number())
    }

    pub fn set_severity_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.severity_text = Some(text.into());
        self
    }

    pub fn set_body(&mut self, body: impl Into<AnyValue>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn set_event_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.event_name = Some(name.into());
        self
    }

    pub fn set_scope(&mut self, scope: impl Into<String>) -> &mut Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn set_trace_context(&mut self, context: TraceContext) -> &mut Self {
        self.trace_context = Some(context);
        self
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<AnyValue>) -> &mut Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn severity_number(&self) -> u8 {
        self.severity_number
    }

    pub fn observed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.observed_timestamp
    }

    pub fn attributes(&self) -> &[(String, AnyValue)] {
        &self.attributes
    }

    pub fn is_written(&self) -> bool {
        self.written
    }

    fn encode(&mut self, level: Level) {
        let eb = &mut self.event;
        eb.reset(self.event_name.as_deref().unwrap_or(DEFAULT_EVENT_NAME), level);

        if let Some(ts) = self.timestamp {
            eb.add_timestamp("time", ts);
        }
        if let Some(ts) = self.observed_timestamp {
            eb.add_timestamp("observed_time", ts);
        }
        eb.add_i64("severity_number", i64::from(self.severity_number));
        let text = self
            .severity_text
            .as_deref()
            .or_else(|| default_severity_text(self.severity_number));
        if let Some(text) = text {
            eb.add_str("severity_text", text);
        }
        if let Some(body) = &self.body {
            eb.add_value("body", body);
        }
        if let Some(ctx) = &self.trace_context {
            eb.add_bytes("trace_id", &ctx.trace_id)
                .add_bytes("span_id", &ctx.span_id)
                .add_i64("trace_flags", i64::from(ctx.trace_flags));
        }
        if let Some(scope) = &self.scope {
            eb.add_str("scope", scope);
        }
        for (key, value) in &self.attributes {
            eb.add_value(key, value);
        }
    }
}

impl Recordable for LogRecord {
    fn prepare(&mut self) -> bool {
        if self.written {
            return false;
        }
        let Some(level) = Level::from_severity_number(self.severity_number) else {
            return false;
        };
        if self.observed_timestamp.is_none() {
            self.observed_timestamp = Some(Utc::now());
        }
        self.level = Some(level);
        true
    }

    fn level(&self) -> Level {
        self.level
            .or_else(|| Level::from_severity_number(self.severity_number))
            .unwrap_or(Level::Verbose)
    }

    fn write_to(&mut self, channel: &dyn TraceChannel) -> i32 {
        let level = self.level();
        self.encode(level);
        let status = self.event.write(channel);
        self.written = true;
        status
    }
}
