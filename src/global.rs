//! Process-wide logger
//!
//! [`init`] installs a single [`Logger`] for the process. The logging macros
//! and the functions here act on that instance.

use std::fmt;
use std::sync::{Mutex, OnceLock};

use crate::config::LoggerConfig;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::logger::Logger;
use crate::record::Location;

static LOGGER: OnceLock<Logger> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Build the process-wide logger from `config`
///
/// Only the first successful call installs a logger. Later calls return
/// [`Error::AlreadyInitialized`] and leave the existing logger untouched. A
/// failed call installs nothing, so `init` may be retried.
pub fn init(config: LoggerConfig) -> Result<()> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if LOGGER.get().is_some() {
        tracing::warn!("Logger already initialized, ignoring new configuration");
        return Err(Error::AlreadyInitialized);
    }

    let logger = Logger::new(config)?;
    if LOGGER.set(logger).is_err() {
        return Err(Error::AlreadyInitialized);
    }
    Ok(())
}

pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

/// The process-wide logger, if [`init`] has succeeded
pub fn try_logger() -> Result<&'static Logger> {
    LOGGER.get().ok_or(Error::NotInitialized)
}

pub fn set_console_enabled(enabled: bool) -> Result<()> {
    try_logger()?.set_console_enabled(enabled);
    Ok(())
}

pub fn set_file_enabled(enabled: bool) -> Result<()> {
    try_logger()?.set_file_enabled(enabled);
    Ok(())
}

pub fn set_max_file_size_bytes(bytes: u64) -> Result<()> {
    try_logger()?.set_max_file_size_bytes(bytes);
    Ok(())
}

pub fn set_level(level: Level) -> Result<()> {
    try_logger()?.set_level(level);
    Ok(())
}

/// Drain queued writes and close the sinks; call once before exit
pub fn flush() -> Result<()> {
    try_logger()?.flush()
}

/// Entry point for the logging macros
///
/// # Panics
///
/// Panics if called before [`init`].
#[doc(hidden)]
pub fn dispatch(level: Level, location: Location, args: fmt::Arguments<'_>) {
    let Some(logger) = LOGGER.get() else {
        panic!("splitlog: log call before splitlog::init");
    };
    if let Err(e) = logger.log(level, Some(location), args) {
        tracing::error!("Failed to emit log line: {}", e);
    }
}
