//! Logging macros
//!
//! The level macros log through the process-wide logger and capture the
//! caller's module, file and line. [`log_to!`](crate::log_to) does the same
//! against an explicit [`Logger`](crate::Logger).

/// Log at an explicit level through the process-wide logger
///
/// ```ignore
/// splitlog::log!(splitlog::Level::Warn, "queue at {}%", 90);
/// ```
#[macro_export]
macro_rules! log {
    ($lvl:expr, $($arg:tt)+) => {
        $crate::global::dispatch(
            $lvl,
            $crate::Location::new(file!(), line!(), module_path!()),
            format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Error, $($arg)+) };
}

/// Log at FATAL severity; the process keeps running
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Fatal, $($arg)+) };
}

/// Log through an explicit logger, returning its `Result`
///
/// ```ignore
/// splitlog::log_to!(logger, splitlog::Level::Info, "started {}", name)?;
/// ```
#[macro_export]
macro_rules! log_to {
    ($logger:expr, $lvl:expr, $($arg:tt)+) => {
        $logger.log(
            $lvl,
            Some($crate::Location::new(file!(), line!(), module_path!())),
            format_args!($($arg)+),
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::level::{Level, Stream};
    use crate::logger::Logger;
    use crate::test_support::{capture_console, test_config};
    use tempfile::TempDir;

    #[test]
    fn test_log_to_captures_module_and_line() {
        let temp_dir = TempDir::new().unwrap();
        let (console, _out, _err) = capture_console(Level::Debug);
        let logger = Logger::with_console(test_config(temp_dir.path()), console).unwrap();

        let line = line!() + 1;
        crate::log_to!(logger, Level::Info, "value {}", 42).unwrap();
        logger.flush().unwrap();

        let info = std::fs::read_to_string(logger.file_path(Stream::Info)).unwrap();
        let expected = format!("[INFO] <splitlog::macros::tests@macros.rs:{}> => value 42\n", line);
        assert!(info.ends_with(&expected), "{}", info);
    }
}
