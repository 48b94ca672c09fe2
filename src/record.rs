//! Log records and line formatting
//!
//! A record is built once per logging call and rendered into a single line
//! that every admitting sink receives unchanged.

use std::fmt::{self, Write as _};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::level::Level;

/// Timestamp layout for rendered lines (millisecond precision, local time)
pub const LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Call site of a logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    /// Module path, when captured by a macro
    pub module: Option<&'static str>,
}

impl Location {
    /// Location captured by the logging macros
    pub const fn new(file: &'static str, line: u32, module: &'static str) -> Self {
        Self {
            file,
            line,
            module: Some(module),
        }
    }

    /// Location of the nearest `#[track_caller]` frame
    #[track_caller]
    pub fn caller() -> Self {
        let caller = std::panic::Location::caller();
        Self {
            file: caller.file(),
            line: caller.line(),
            module: None,
        }
    }

    fn file_name(&self) -> &str {
        Path::new(self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.module {
            Some(module) => write!(f, "<{}@{}:{}>", module, self.file_name(), self.line),
            None => write!(f, "<{}:{}>", self.file_name(), self.line),
        }
    }
}

/// A single logging call, ready to be formatted
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub location: Option<Location>,
    pub args: fmt::Arguments<'a>,
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current local time
    pub fn new(level: Level, location: Option<Location>, args: fmt::Arguments<'a>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            location,
            args,
        }
    }

    /// Render the record as one newline-terminated line
    ///
    /// Format: `2026-01-21 14:30:45.123 [INFO] <app::net@conn.rs:42> => message`
    pub fn format_line(&self) -> String {
        let mut line = String::with_capacity(64);
        let _ = write!(
            line,
            "{} [{}] ",
            self.timestamp.format(LINE_TIME_FORMAT),
            self.level.as_str()
        );
        if let Some(location) = &self.location {
            let _ = write!(line, "{} => ", location);
        }
        let _ = line.write_fmt(self.args);
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_record<'a>(
        level: Level,
        location: Option<Location>,
        args: fmt::Arguments<'a>,
    ) -> Record<'a> {
        Record {
            timestamp: Local.with_ymd_and_hms(2026, 1, 21, 14, 30, 45).unwrap()
                + chrono::Duration::milliseconds(7),
            level,
            location,
            args,
        }
    }

    #[test]
    fn test_format_line_with_module_location() {
        let location = Location::new("src/net/conn.rs", 42, "app::net");
        let line =
            fixed_record(Level::Info, Some(location), format_args!("hello {}", 1)).format_line();
        assert_eq!(
            line,
            "2026-01-21 14:30:45.007 [INFO] <app::net@conn.rs:42> => hello 1\n"
        );
    }

    #[test]
    fn test_format_line_without_location() {
        let line = fixed_record(Level::Fatal, None, format_args!("boom")).format_line();
        assert_eq!(line, "2026-01-21 14:30:45.007 [FATAL] boom\n");
    }

    #[test]
    fn test_format_line_keeps_single_trailing_newline() {
        let line =
            fixed_record(Level::Warn, None, format_args!("already terminated\n")).format_line();
        assert!(line.ends_with("terminated\n"));
        assert!(!line.ends_with("\n\n"));
    }

    #[test]
    fn test_caller_location_points_here() {
        let location = Location::caller();
        assert!(location.file.ends_with("record.rs"));
        assert!(location.module.is_none());
        assert_eq!(location.to_string(), format!("<record.rs:{}>", location.line));
    }
}
