//! Severity levels and threshold checks

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log severity, ordered from most to least verbose.
///
/// `Off` is a sentinel above every real level: it can be used as a threshold
/// to silence everything, but a record is never emitted at `Off`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose - trace execution flow
    Trace = 0,
    /// Debug information
    Debug = 1,
    /// General information
    #[default]
    Info = 2,
    /// Warnings
    Warn = 3,
    /// Errors
    Error = 4,
    /// Unrecoverable failures
    Fatal = 5,
    /// Disables logging
    Off = 6,
}

impl LogLevel {
    /// Every level that a record can be emitted at.
    pub const RECORDABLE: [LogLevel; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    /// Convert to the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Off => "off",
        }
    }

    /// Look up a level by its numeric index (`0` = trace .. `6` = off).
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Trace),
            1 => Some(Self::Debug),
            2 => Some(Self::Info),
            3 => Some(Self::Warn),
            4 => Some(Self::Error),
            5 => Some(Self::Fatal),
            6 => Some(Self::Off),
            _ => None,
        }
    }

    /// Parse a level from configuration or command-line text.
    ///
    /// Numbers are accepted when they name a level. Anything else is
    /// matched on its first letter only, so `"w"`, `"warn"` and `"wat"`
    /// all mean [`LogLevel::Warn`]. Unrecognised input falls back to
    /// [`LogLevel::Info`].
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        let Some(first) = text.chars().next() else {
            return Self::Info;
        };

        if first.is_ascii_digit() {
            let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
            return digits
                .parse::<i64>()
                .ok()
                .and_then(Self::from_index)
                .unwrap_or(Self::Info);
        }

        match first.to_ascii_lowercase() {
            't' => Self::Trace,
            'd' => Self::Debug,
            'i' => Self::Info,
            'w' => Self::Warn,
            'e' => Self::Error,
            'f' => Self::Fatal,
            'o' => Self::Off,
            _ => Self::Info,
        }
    }

    /// Check whether a record at this level passes `threshold`.
    pub fn is_enabled(&self, threshold: LogLevel) -> bool {
        threshold <= *self && *self < Self::Off
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
