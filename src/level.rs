//! Severity levels and level-to-stream routing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Debug,
    Trace,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// All levels in ascending order
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Trace,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Get the tag rendered in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Check if this level is an error or worse
    pub fn is_alert(&self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Level::as_u8`]; out-of-range values fall back to `Debug`
    pub(crate) fn from_u8(value: u8) -> Self {
        Self::ALL
            .get(value as usize)
            .copied()
            .unwrap_or(Level::Debug)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Configuration(format!("unknown log level '{}'", s)))
    }
}

/// Output stream a line is routed to
///
/// For the console, `Info` is stdout and `Warn` is stderr. For the file sink,
/// `Info` is `<file>-info.log` and `Warn` is `<file>-warn.log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Info,
    Warn,
}

impl Stream {
    /// Suffix used in the active file name
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Stream::Info => "info",
            Stream::Warn => "warn",
        }
    }
}

/// Explicit level-to-stream table
///
/// Every level has its own entry so the split between the two streams is
/// visible in configuration instead of being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRouting {
    #[serde(default = "info_stream")]
    pub debug: Stream,
    #[serde(default = "info_stream")]
    pub trace: Stream,
    #[serde(default = "info_stream")]
    pub info: Stream,
    #[serde(default = "info_stream")]
    pub warn: Stream,
    #[serde(default = "warn_stream")]
    pub error: Stream,
    #[serde(default = "warn_stream")]
    pub fatal: Stream,
}

fn info_stream() -> Stream {
    Stream::Info
}

fn warn_stream() -> Stream {
    Stream::Warn
}

impl Default for StreamRouting {
    fn default() -> Self {
        Self {
            debug: Stream::Info,
            trace: Stream::Info,
            info: Stream::Info,
            warn: Stream::Info,
            error: Stream::Warn,
            fatal: Stream::Warn,
        }
    }
}

impl StreamRouting {
    /// Look up the stream for a level
    pub fn stream_for(&self, level: Level) -> Stream {
        match level {
            Level::Debug => self.debug,
            Level::Trace => self.trace,
            Level::Info => self.info,
            Level::Warn => self.warn,
            Level::Error => self.error,
            Level::Fatal => self.fatal,
        }
    }

    /// Override the stream for a single level
    pub fn with(mut self, level: Level, stream: Stream) -> Self {
        let slot = match level {
            Level::Debug => &mut self.debug,
            Level::Trace => &mut self.trace,
            Level::Info => &mut self.info,
            Level::Warn => &mut self.warn,
            Level::Error => &mut self.error,
            Level::Fatal => &mut self.fatal,
        };
        *slot = stream;
        self
    }
}
