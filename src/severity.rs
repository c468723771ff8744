//! Severity levels used to route records to tracepoint channels.
//!
//! The level set is closed and fixed at compile time. Each level owns one
//! channel, registered as `<provider>_L<n>K1` where `n` is the kernel level
//! number (1 = critical ... 5 = verbose).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyword suffix baked into every channel name.
const CHANNEL_KEYWORD: u64 = 1;

/// Severity level of an exported record.
///
/// Ordered from least to most severe; the declaration order is the index
/// into the channel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Verbose,
    Informational,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Number of levels, and therefore of registered channels.
    pub const COUNT: usize = 5;

    /// Every level, in index order.
    pub const ALL: [Level; Level::COUNT] = [
        Level::Verbose,
        Level::Informational,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Position of this level in [`Level::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Level number as understood by the kernel tracing facility.
    pub const fn kernel_level(self) -> u8 {
        match self {
            Level::Critical => 1,
            Level::Error => 2,
            Level::Warning => 3,
            Level::Informational => 4,
            Level::Verbose => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Verbose => "verbose",
            Level::Informational => "informational",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }

    /// Map an OpenTelemetry severity number (1..=24) onto a level.
    ///
    /// Returns `None` for 0 (unspecified) and anything above 24.
    pub const fn from_severity_number(number: u8) -> Option<Level> {
        match number {
            1..=8 => Some(Level::Verbose),
            9..=12 => Some(Level::Informational),
            13..=16 => Some(Level::Warning),
            17..=20 => Some(Level::Error),
            21..=24 => Some(Level::Critical),
            _ => None,
        }
    }

    /// Canonical severity number written for this level: the first number
    /// of the level's band, except `Verbose` which uses DEBUG (5) rather
    /// than TRACE (1).
    pub const fn canonical_severity_number(self) -> u8 {
        match self {
            Level::Verbose => 5,
            Level::Informational => 9,
            Level::Warning => 13,
            Level::Error => 17,
            Level::Critical => 21,
        }
    }

    /// Inverse of [`kernel_level`](Level::kernel_level).
    pub const fn from_kernel_level(level: u8) -> Option<Level> {
        match level {
            1 => Some(Level::Critical),
            2 => Some(Level::Error),
            3 => Some(Level::Warning),
            4 => Some(Level::Informational),
            5 => Some(Level::Verbose),
            _ => None,
        }
    }

    /// Recover the level and keyword from a channel name produced by
    /// [`channel_name`](Level::channel_name) for `provider_name`.
    pub fn parse_channel_name(provider_name: &str, channel: &str) -> Option<(Level, u64)> {
        let suffix = channel.strip_prefix(provider_name)?.strip_prefix("_L")?;
        let (level, keyword) = suffix.split_once('K')?;
        let level = Level::from_kernel_level(level.parse().ok()?)?;
        let keyword = u64::from_str_radix(keyword, 16).ok()?;
        Some((level, keyword))
    }

    /// Tracepoint name of this level's channel for the given provider.
    pub fn channel_name(self, provider_name: &str) -> String {
        format!(
            "{}_L{}K{:x}",
            provider_name,
            self.kernel_level(),
            CHANNEL_KEYWORD
        )
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verbose" | "trace" | "debug" => Ok(Level::Verbose),
            "informational" | "info" => Ok(Level::Informational),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "critical" | "fatal" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Short severity text OpenTelemetry associates with a severity number.
pub fn default_severity_text(number: u8) -> Option<&'static str> {
    const NAMES: [&str; 24] = [
        "TRACE", "TRACE2", "TRACE3", "TRACE4", "DEBUG", "DEBUG2", "DEBUG3", "DEBUG4", "INFO",
        "INFO2", "INFO3", "INFO4", "WARN", "WARN2", "WARN3", "WARN4", "ERROR", "ERROR2", "ERROR3",
        "ERROR4", "FATAL", "FATAL2", "FATAL3", "FATAL4",
    ];
    match number {
        1..=24 => Some(NAMES[usize::from(number) - 1]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }

    #[test]
    fn severity_number_boundaries() {
        assert_eq!(Level::from_severity_number(0), None);
        assert_eq!(Level::from_severity_number(1), Some(Level::Verbose));
        assert_eq!(Level::from_severity_number(8), Some(Level::Verbose));
        assert_eq!(Level::from_severity_number(9), Some(Level::Informational));
        assert_eq!(Level::from_severity_number(16), Some(Level::Warning));
        assert_eq!(Level::from_severity_number(17), Some(Level::Error));
        assert_eq!(Level::from_severity_number(24), Some(Level::Critical));
        assert_eq!(Level::from_severity_number(25), None);
    }

    #[test]
    fn canonical_severity_round_trips_through_mapping() {
        for level in Level::ALL {
            assert_eq!(Level::from_severity_number(level.canonical_severity_number()), Some(level));
        }
        // Verbose writes DEBUG, not the bottom of its band.
        assert_eq!(Level::Verbose.canonical_severity_number(), 5);
        assert_eq!(default_severity_text(Level::Verbose.canonical_severity_number()), Some("DEBUG"));
        assert_eq!(Level::Critical.canonical_severity_number(), 21);
    }

    #[test]
    fn channel_names_parse_back() {
        for level in Level::ALL {
            let name = level.channel_name("svc_a");
            assert_eq!(Level::parse_channel_name("svc_a", &name), Some((level, 1)));
            assert_eq!(Level::from_kernel_level(level.kernel_level()), Some(level));
        }
        assert_eq!(Level::parse_channel_name("svc_a", "svc_a_L9K1"), None);
        assert_eq!(Level::parse_channel_name("svc_a", "other_L2K1"), None);
        assert_eq!(Level::parse_channel_name("svc_a", "svc_a_L2"), None);
        assert_eq!(Level::parse_channel_name("svc", "svc_L3K1f"), Some((Level::Warning, 0x1f)));
    }

    #[test]
    fn channel_names_are_stable() {
        assert_eq!(Level::Critical.channel_name("myprov"), "myprov_L1K1");
        assert_eq!(Level::Verbose.channel_name("myprov"), "myprov_L5K1");
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warning));
        assert_eq!("fatal".parse::<Level>(), Ok(Level::Critical));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn default_text() {
        assert_eq!(default_severity_text(9), Some("INFO"));
        assert_eq!(default_severity_text(18), Some("ERROR2"));
        assert_eq!(default_severity_text(0), None);
    }
}
