//! Error types for the logging core

use std::io;
use std::path::PathBuf;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring, opening, rotating or writing log sinks
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failed to create the log directory
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to open an active log file
    #[error("Failed to open log file {path}: {source}")]
    Open {
        /// The file that could not be opened
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to move an active log file to its backup name
    #[error("Failed to rotate log file {path}: {source}")]
    Rotation {
        /// The active file being rotated
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Any other I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The process-wide logger was initialized more than once
    #[error("Logger is already initialized")]
    AlreadyInitialized,

    /// The process-wide logger was used before initialization
    #[error("Logger is not initialized")]
    NotInitialized,

    /// A queued write to this file failed; the stream accepts no more lines
    #[error("Log file {path} failed on an earlier write")]
    SinkFailed {
        /// The active file of the failed stream
        path: PathBuf,
    },

    /// A sink was written to after it was closed by a flush
    #[error("Log sink is closed")]
    SinkClosed,

    /// The async writer is no longer accepting jobs
    #[error("Failed to enqueue log line: writer closed")]
    PipelineClosed,
}
