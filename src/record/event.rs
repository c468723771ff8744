//! Structured event handed to a trace channel.
//!
//! A [`TraceEvent`] is the typed field list a record encodes itself into.
//! Channels turn it into their own wire form: the Linux user_events channel
//! feeds it to an EventHeader builder, the in-process channel keeps a copy.
//! Records reuse one event across writes, so `reset` keeps allocations.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::AnyValue;
use crate::provider::TraceChannel;
use crate::severity::Level;

/// Typed value of one event field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Timestamps travel as RFC 3339 text with nanosecond precision.
    pub fn timestamp_text(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventField {
    pub name: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

/// Named, leveled list of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEvent {
    name: String,
    level: Level,
    fields: Vec<EventField>,
}

impl Default for TraceEvent {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: Level::Verbose,
            fields: Vec::new(),
        }
    }
}

impl TraceEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new event, dropping any previous fields.
    pub fn reset(&mut self, name: &str, level: Level) -> &mut Self {
        self.name.clear();
        self.name.push_str(name);
        self.level = level;
        self.fields.clear();
        self
    }

    fn push(&mut self, name: &str, value: FieldValue) -> &mut Self {
        self.fields.push(EventField {
            name: name.to_string(),
            value,
        });
        self
    }

    pub fn add_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.push(name, FieldValue::Bool(value))
    }

    pub fn add_i64(&mut self, name: &str, value: i64) -> &mut Self {
        self.push(name, FieldValue::I64(value))
    }

    pub fn add_f64(&mut self, name: &str, value: f64) -> &mut Self {
        self.push(name, FieldValue::F64(value))
    }

    pub fn add_str(&mut self, name: &str, value: &str) -> &mut Self {
        self.push(name, FieldValue::Str(value.to_string()))
    }

    pub fn add_bytes(&mut self, name: &str, value: &[u8]) -> &mut Self {
        self.push(name, FieldValue::Bytes(value.to_vec()))
    }

    pub fn add_timestamp(&mut self, name: &str, value: DateTime<Utc>) -> &mut Self {
        self.push(name, FieldValue::Timestamp(value))
    }

    pub fn add_value(&mut self, name: &str, value: &AnyValue) -> &mut Self {
        match value {
            AnyValue::Bool(v) => self.add_bool(name, *v),
            AnyValue::Int(v) => self.add_i64(name, *v),
            AnyValue::Double(v) => self.add_f64(name, *v),
            AnyValue::String(v) => self.add_str(name, v),
            AnyValue::Bytes(v) => self.add_bytes(name, v),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn fields(&self) -> &[EventField] {
        &self.fields
    }

    /// First field called `name`.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Hand the event to `channel`.
    pub fn write(&self, channel: &dyn TraceChannel) -> i32 {
        channel.write(self)
    }
}
