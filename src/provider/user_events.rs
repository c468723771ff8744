//! Linux user_events provider built on EventHeader.
//!
//! Each channel is an `eventheader_dynamic` event set, which registers the
//! tracepoint `<provider>_L<level>K<keyword>` with the kernel. The kernel
//! flips the set's enabled bit when a perf or ftrace session attaches, so
//! `enabled` is a plain load on the hot path. Registration never fails from
//! the caller's point of view: without tracefs the set simply stays
//! disabled.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use eventheader::{FieldFormat, Level as HeaderLevel};
use eventheader_dynamic as ehd;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{validate_provider_name, Provider, TraceChannel};
use crate::error::ProviderError;
use crate::record::event::{FieldValue, TraceEvent};
use crate::severity::Level;

thread_local! {
    static BUILDER: RefCell<ehd::EventBuilder> = RefCell::new(ehd::EventBuilder::new());
}

fn header_level(level: Level) -> HeaderLevel {
    match level {
        Level::Critical => HeaderLevel::CriticalError,
        Level::Error => HeaderLevel::Error,
        Level::Warning => HeaderLevel::Warning,
        Level::Informational => HeaderLevel::Informational,
        Level::Verbose => HeaderLevel::Verbose,
    }
}

/// Translate a [`TraceEvent`] into EventHeader fields.
fn fill(eb: &mut ehd::EventBuilder, event: &TraceEvent) {
    eb.reset(event.name(), 0);
    for field in event.fields() {
        let name = field.name.as_str();
        match &field.value {
            FieldValue::Bool(v) => eb.add_value(name, u8::from(*v), FieldFormat::Boolean, 0),
            FieldValue::I64(v) => eb.add_value(name, *v, FieldFormat::SignedInt, 0),
            FieldValue::F64(v) => eb.add_value(name, *v, FieldFormat::Float, 0),
            FieldValue::Str(v) => eb.add_str(name, v.as_bytes(), FieldFormat::StringUtf, 0),
            FieldValue::Bytes(v) => eb.add_str(name, v.as_slice(), FieldFormat::HexBytes, 0),
            FieldValue::Timestamp(ts) => eb.add_str(
                name,
                FieldValue::timestamp_text(ts),
                FieldFormat::StringUtf,
                0,
            ),
        };
    }
}

/// A tracepoint registered through EventHeader.
pub struct UserEventsChannel {
    name: String,
    level: Level,
    set: Arc<ehd::EventSet>,
}

impl UserEventsChannel {
    pub fn level(&self) -> Level {
        self.level
    }
}

impl fmt::Debug for UserEventsChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserEventsChannel")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("enabled", &self.set.enabled())
            .finish()
    }
}

impl TraceChannel for UserEventsChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.set.enabled()
    }

    fn write(&self, event: &TraceEvent) -> i32 {
        BUILDER.with(|cell| match cell.try_borrow_mut() {
            Ok(mut eb) => {
                fill(&mut eb, event);
                eb.write(&self.set, None, None)
            }
            // Re-entered from inside a write on this thread.
            Err(_) => {
                let mut eb = ehd::EventBuilder::new();
                fill(&mut eb, event);
                eb.write(&self.set, None, None)
            }
        })
    }
}

struct Inner {
    provider: ehd::Provider,
    channels: Vec<Arc<UserEventsChannel>>,
}

/// Provider writing to the kernel's user_events facility.
pub struct UserEventsProvider {
    name: String,
    inner: Mutex<Inner>,
}

impl fmt::Debug for UserEventsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserEventsProvider")
            .field("name", &self.name)
            .field("channels", &self.inner.lock().channels.len())
            .finish()
    }
}

impl Provider for UserEventsProvider {
    type Channel = UserEventsChannel;

    fn open(name: &str) -> Result<Self, ProviderError> {
        validate_provider_name(name)?;
        let provider = ehd::Provider::new(name, &ehd::Provider::new_options());
        debug!(provider = name, "opened user_events provider");
        Ok(Self {
            name: name.to_string(),
            inner: Mutex::new(Inner {
                provider,
                channels: Vec::new(),
            }),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// The level is recovered from `name`; `version` becomes the EventHeader
    /// keyword, so the kernel tracepoint carries the same name.
    fn register_channel(&self, name: &str, version: u8) -> Arc<UserEventsChannel> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.channels.iter().find(|c| c.name == name) {
            return existing.clone();
        }

        let level = match Level::parse_channel_name(&self.name, name) {
            Some((level, _)) => level,
            None => {
                warn!(channel = name, "channel name carries no level, registering as verbose");
                Level::Verbose
            }
        };
        let set = inner
            .provider
            .register_set(header_level(level), u64::from(version));

        let channel = Arc::new(UserEventsChannel {
            name: name.to_string(),
            level,
            set,
        });
        inner.channels.push(channel.clone());
        channel
    }
}
