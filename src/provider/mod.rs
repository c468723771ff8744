//! Tracing provider abstraction.
//!
//! A provider registers named channels with the OS tracing facility and
//! hands back shared handles. Whether anyone listens on a channel is decided
//! outside this process and may change at any time.

mod memory;
#[cfg(target_os = "linux")]
mod user_events;

use std::sync::Arc;

use crate::error::ProviderError;
use crate::record::event::TraceEvent;

pub use memory::{MemoryChannel, MemoryProvider};
#[cfg(target_os = "linux")]
pub use user_events::{UserEventsChannel, UserEventsProvider};

/// Status returned by a successful [`TraceChannel::write`].
pub const WRITE_OK: i32 = 0;

/// Longest provider name accepted (exclusive), leaving room for the
/// per-level suffix within the tracepoint name limit.
pub const MAX_PROVIDER_NAME_LEN: usize = 234;

/// A registered tracepoint channel.
pub trait TraceChannel: Send + Sync {
    /// Tracepoint name this channel was registered under.
    fn name(&self) -> &str;

    /// Whether a consumer is currently attached.
    fn enabled(&self) -> bool;

    /// Encode and write an event. Returns [`WRITE_OK`] on success, otherwise
    /// an errno-style code from the tracing facility.
    fn write(&self, event: &TraceEvent) -> i32;
}

/// A tracing provider capable of registering channels.
pub trait Provider: Send + Sync {
    type Channel: TraceChannel;

    /// Initialize the provider. Fails only if the facility itself cannot be
    /// brought up or the name is unusable.
    fn open(name: &str) -> Result<Self, ProviderError>
    where
        Self: Sized;

    fn name(&self) -> &str;

    /// Register a channel. `name` comes from
    /// [`Level::channel_name`](crate::severity::Level::channel_name) and
    /// `version` is the keyword/version tag baked into it. Always yields a
    /// handle; absence of a listener is reported by
    /// [`TraceChannel::enabled`], not here.
    fn register_channel(&self, name: &str, version: u8) -> Arc<Self::Channel>;
}

/// Check a provider name against the tracepoint naming rules.
pub fn validate_provider_name(name: &str) -> Result<(), ProviderError> {
    let invalid = |reason| ProviderError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() >= MAX_PROVIDER_NAME_LEN {
        return Err(invalid("name must be shorter than 234 bytes"));
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(invalid("only ASCII letters, digits and '_' are allowed"));
    }
    Ok(())
}
