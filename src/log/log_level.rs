use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::log::log_error::LogError;

/// Defines the severity levels for log messages, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Detailed debug information.
    Debug,
    /// Interesting events, e.g. a user logs in.
    Info,
    /// Normal but significant events.
    Notice,
    /// Exceptional occurrences that are not errors.
    Warning,
    /// Runtime errors that do not require immediate action.
    Error,
    /// Critical conditions, e.g. an application component is unavailable.
    Critical,
    /// Action must be taken immediately.
    Alert,
    /// The system is unusable.
    Emergency,
}

impl LogLevel {
    /// Every level in rank order.
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Alert,
        LogLevel::Emergency,
    ];

    /// Numeric position in the total order. Strictly increasing with severity.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Canonical lowercase name, also used as the level file stem.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Notice => "notice",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
            LogLevel::Alert => "alert",
            LogLevel::Emergency => "emergency",
        }
    }

    /// Returns `true` when a record at `self` passes a `minimum` threshold.
    #[must_use]
    pub const fn passes(self, minimum: LogLevel) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    /// Parses one of the eight canonical names. Matching is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|lvl| lvl.as_str() == s)
            .ok_or_else(|| LogError::InvalidLevel(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn ranks_are_strictly_increasing() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank(), "{pair:?}");
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for lvl in LogLevel::ALL {
            assert_eq!(lvl.as_str().parse::<LogLevel>().unwrap(), lvl);
            assert_eq!(lvl.to_string(), lvl.as_str());
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        for bad in ["", "warn", "WARNING", "fatal", " info"] {
            match bad.parse::<LogLevel>() {
                Err(LogError::InvalidLevel(name)) => assert_eq!(name, bad),
                other => panic!("expected InvalidLevel for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn passes_matches_rank_comparison() {
        for lvl in LogLevel::ALL {
            for min in LogLevel::ALL {
                assert_eq!(lvl.passes(min), lvl.rank() >= min.rank());
            }
        }
    }

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&LogLevel::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
