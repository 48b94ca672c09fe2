//! splitlog - leveled logging to the console and to split, rotating files
//!
//! Lines at or above a configured level go to a console sink (stdout or
//! stderr) and to a file sink that separates routine output
//! (`<file>-info.log`) from alerts (`<file>-warn.log`). File writes are
//! queued to a single background writer, and each file is rotated to a
//! timestamped backup once it reaches the configured size.

pub mod config;
pub mod error;
pub mod global;
pub mod level;
pub mod logger;
mod macros;
pub mod pipeline;
pub mod record;
pub mod rotation;
pub mod sink;

#[cfg(test)]
mod test_support;

pub use config::LoggerConfig;
pub use error::{Error, Result};
pub use global::{
    flush, init, is_initialized, set_console_enabled, set_file_enabled, set_level,
    set_max_file_size_bytes, try_logger,
};
pub use level::{Level, Stream, StreamRouting};
pub use logger::Logger;
pub use record::Location;
pub use rotation::RetentionPolicy;
pub use sink::SinkKind;
