//! Fixed level-to-channel table.
//!
//! Built once when the exporter is constructed and read-only afterwards,
//! so lookups take no lock.

use std::sync::Arc;

use crate::provider::{Provider, TraceChannel};
use crate::severity::Level;

/// Version tag passed to the provider for every channel. The EventHeader
/// provider registers it as the event set keyword, the `K1` in tracepoint
/// names.
pub const ENCODING_VERSION: u8 = 1;

/// One registered channel per [`Level`], indexed by [`Level::index`].
pub struct ChannelRegistry<C> {
    channels: [Arc<C>; Level::COUNT],
}

impl<C: TraceChannel> ChannelRegistry<C> {
    /// Register a channel for every level with `provider`.
    pub fn new<P>(provider: &P) -> Self
    where
        P: Provider<Channel = C>,
    {
        let channels = std::array::from_fn(|i| {
            let name = Level::ALL[i].channel_name(provider.name());
            provider.register_channel(&name, ENCODING_VERSION)
        });
        Self { channels }
    }

    /// Channel for `level`. Constant time, never fails.
    #[inline]
    pub fn resolve(&self, level: Level) -> &C {
        &self.channels[level.index()]
    }

    /// Shared handle to the channel for `level`.
    pub fn handle(&self, level: Level) -> Arc<C> {
        Arc::clone(&self.channels[level.index()])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &C)> + '_ {
        Level::ALL
            .iter()
            .map(move |&level| (level, self.resolve(level)))
    }

    /// Levels whose channel currently has a consumer.
    pub fn enabled_levels(&self) -> Vec<Level> {
        self.iter()
            .filter(|(_, channel)| channel.enabled())
            .map(|(level, _)| level)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    #[test]
    fn registers_one_channel_per_level() {
        let provider = MemoryProvider::open("reg").unwrap();
        let registry = ChannelRegistry::new(&provider);

        assert_eq!(provider.channels().len(), Level::COUNT);
        for level in Level::ALL {
            let channel = registry.resolve(level);
            assert_eq!(channel.name(), level.channel_name("reg"));
            assert_eq!(channel.version(), ENCODING_VERSION);
        }
    }

    #[test]
    fn handle_shares_provider_channel() {
        let provider = MemoryProvider::open("reg").unwrap();
        let registry = ChannelRegistry::new(&provider);
        let handle = registry.handle(Level::Error);
        let from_provider = provider.channel("reg_L2K1").unwrap();
        assert!(Arc::ptr_eq(&handle, &from_provider));
    }

    #[test]
    fn enabled_levels_follow_controller() {
        let provider = MemoryProvider::open("reg").unwrap();
        let registry = ChannelRegistry::new(&provider);
        assert!(registry.enabled_levels().is_empty());

        provider.set_enabled(&Level::Warning.channel_name("reg"), true);
        assert_eq!(registry.enabled_levels(), vec![Level::Warning]);
    }
}
