//! In-process provider.
//!
//! Channels live in shared memory instead of the kernel. A controller flips
//! them on and off, and every write is captured for inspection. Uses
//! parking_lot locks; nothing here blocks on I/O.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{validate_provider_name, Provider, TraceChannel, WRITE_OK};
use crate::error::ProviderError;
use crate::record::event::TraceEvent;

/// A channel registered with a [`MemoryProvider`].
#[derive(Debug)]
pub struct MemoryChannel {
    name: String,
    version: u8,
    enabled: AtomicBool,
    fail_code: AtomicI32,
    attempts: AtomicUsize,
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryChannel {
    fn new(name: &str, version: u8) -> Self {
        Self {
            name: name.to_string(),
            version,
            enabled: AtomicBool::new(false),
            fail_code: AtomicI32::new(WRITE_OK),
            attempts: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Attach or detach the simulated consumer.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Make every following write return `code`. Pass [`WRITE_OK`] to
    /// restore normal behaviour.
    pub fn fail_writes_with(&self, code: i32) {
        self.fail_code.store(code, Ordering::Release);
    }

    /// Number of write calls, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }

    /// Events that were written successfully, oldest first.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.attempts.store(0, Ordering::Release);
    }
}

impl TraceChannel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn write(&self, event: &TraceEvent) -> i32 {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        let code = self.fail_code.load(Ordering::Acquire);
        if code != WRITE_OK {
            return code;
        }
        self.events.lock().push(event.clone());
        WRITE_OK
    }
}

#[derive(Debug)]
struct Shared {
    name: String,
    channels: Mutex<Vec<Arc<MemoryChannel>>>,
}

/// Provider whose channels are controlled from inside the process.
///
/// Clones share the same channels, so a test or controller can keep a clone
/// while the exporter owns another.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    shared: Arc<Shared>,
}

impl MemoryProvider {
    /// Look up a registered channel by tracepoint name.
    pub fn channel(&self, name: &str) -> Option<Arc<MemoryChannel>> {
        self.shared
            .channels
            .lock()
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// All registered channels, in registration order.
    pub fn channels(&self) -> Vec<Arc<MemoryChannel>> {
        self.shared.channels.lock().clone()
    }

    /// Enable or disable a channel by name. Returns false if no such
    /// channel is registered.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.channel(name) {
            Some(channel) => {
                channel.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    pub fn set_all_enabled(&self, enabled: bool) {
        for channel in self.shared.channels.lock().iter() {
            channel.set_enabled(enabled);
        }
    }

    /// Write calls across every channel.
    pub fn total_write_attempts(&self) -> usize {
        self.shared
            .channels
            .lock()
            .iter()
            .map(|c| c.write_attempts())
            .sum()
    }
}

impl Provider for MemoryProvider {
    type Channel = MemoryChannel;

    fn open(name: &str) -> Result<Self, ProviderError> {
        validate_provider_name(name)?;
        Ok(Self {
            shared: Arc::new(Shared {
                name: name.to_string(),
                channels: Mutex::new(Vec::new()),
            }),
        })
    }

    fn name(&self) -> &str {
        &self.shared.name
    }

    fn register_channel(&self, name: &str, version: u8) -> Arc<MemoryChannel> {
        let mut channels = self.shared.channels.lock();
        if let Some(existing) = channels.iter().find(|c| c.name == name) {
            return existing.clone();
        }
        let channel = Arc::new(MemoryChannel::new(name, version));
        channels.push(channel.clone());
        channel
    }
}
