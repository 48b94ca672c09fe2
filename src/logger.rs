//! The logger: sink registry and dispatch
//!
//! A [`Logger`] owns a fixed list of sinks (console first, then file) plus the
//! switches that may change after construction: the console and file enable
//! flags, per-sink levels, and the rotation threshold.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::level::{Level, Stream};
use crate::pipeline::WritePipeline;
use crate::record::{Location, Record};
use crate::sink::{stream_path, ConsoleSink, FileSink, Sink, SinkKind};

/// Leveled logger fanning out to a console sink and a file sink
pub struct Logger {
    sinks: Vec<Box<dyn Sink>>,
    console_enabled: AtomicBool,
    file_enabled: AtomicBool,
    max_file_size: Arc<AtomicU64>,
    pipeline: Arc<WritePipeline>,
    info_path: PathBuf,
    warn_path: PathBuf,
}

impl Logger {
    /// Build a logger writing to stdout/stderr and the configured files
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let console = ConsoleSink::new(config.level, config.console_routing);
        Self::with_console(config, console)
    }

    /// Build a logger around a caller-supplied console sink
    ///
    /// Fails without registering anything if the configuration is invalid or
    /// either file cannot be opened.
    pub fn with_console(config: LoggerConfig, console: ConsoleSink) -> Result<Self> {
        config.validate()?;
        let options = config.file_sink_options()?;
        let info_path = stream_path(&options.dir, &options.base_name, Stream::Info);
        let warn_path = stream_path(&options.dir, &options.base_name, Stream::Warn);

        let max_file_size = Arc::new(AtomicU64::new(config.max_file_size_bytes));
        let pipeline = Arc::new(WritePipeline::start(config.buffer_size)?);
        let file = FileSink::open(
            config.level,
            options,
            Arc::clone(&max_file_size),
            Arc::clone(&pipeline),
        )?;

        tracing::info!(
            "Logging to {} and {} (level {}, rotate at {} bytes)",
            info_path.display(),
            warn_path.display(),
            config.level,
            config.max_file_size_bytes
        );

        Ok(Self {
            sinks: vec![Box::new(console), Box::new(file)],
            console_enabled: AtomicBool::new(config.console),
            file_enabled: AtomicBool::new(config.file_enabled),
            max_file_size,
            pipeline,
            info_path,
            warn_path,
        })
    }

    /// Render and emit a message to every enabled sink that admits `level`
    ///
    /// The line is rendered at most once. Every admitting sink is attempted;
    /// the first emit error is returned.
    pub fn log(
        &self,
        level: Level,
        location: Option<Location>,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        let mut line: Option<String> = None;
        let mut first_error = None;

        for sink in self.sinks.iter().filter(|s| self.class_enabled(s.kind())) {
            if !sink.enabled(level) {
                continue;
            }
            let line =
                line.get_or_insert_with(|| Record::new(level, location, args).format_line());
            if let Err(e) = sink.emit(level, line) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Debug, Some(Location::caller()), args)
    }

    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Trace, Some(Location::caller()), args)
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Info, Some(Location::caller()), args)
    }

    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Warn, Some(Location::caller()), args)
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Error, Some(Location::caller()), args)
    }

    /// Log at FATAL severity. This does not terminate the process.
    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.log(Level::Fatal, Some(Location::caller()), args)
    }

    /// Wait for every queued file write, then close all sinks
    ///
    /// Blocks for as long as producers keep the queue busy. Calling it again
    /// is harmless; file sinks stay closed.
    pub fn flush(&self) -> Result<()> {
        self.pipeline.wait_idle();

        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.close() {
                first_error.get_or_insert(e);
            }
        }
        tracing::debug!("Flushed log sinks");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn set_console_enabled(&self, enabled: bool) {
        self.console_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn console_enabled(&self) -> bool {
        self.console_enabled.load(Ordering::Relaxed)
    }

    pub fn set_file_enabled(&self, enabled: bool) {
        self.file_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn file_enabled(&self) -> bool {
        self.file_enabled.load(Ordering::Relaxed)
    }

    /// Set the rotation threshold for both files (at least one byte)
    pub fn set_max_file_size_bytes(&self, bytes: u64) {
        self.max_file_size.store(bytes.max(1), Ordering::Relaxed);
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size.load(Ordering::Relaxed)
    }

    /// Set the level of every sink
    pub fn set_level(&self, level: Level) {
        for sink in &self.sinks {
            sink.set_level(level);
        }
    }

    /// Set the level of the sinks of one class
    pub fn set_sink_level(&self, kind: SinkKind, level: Level) {
        for sink in self.sinks.iter().filter(|s| s.kind() == kind) {
            sink.set_level(level);
        }
    }

    /// Level of the first sink of a class
    pub fn sink_level(&self, kind: SinkKind) -> Option<Level> {
        self.sinks
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.level())
    }

    /// Path of the active file for `stream`
    pub fn file_path(&self, stream: Stream) -> &Path {
        match stream {
            Stream::Info => &self.info_path,
            Stream::Warn => &self.warn_path,
        }
    }

    /// File writes queued but not yet performed
    pub fn pending_writes(&self) -> usize {
        self.pipeline.pending()
    }

    fn class_enabled(&self, kind: SinkKind) -> bool {
        match kind {
            SinkKind::Console => self.console_enabled(),
            SinkKind::File => self.file_enabled(),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sinks", &self.sinks.len())
            .field("console_enabled", &self.console_enabled())
            .field("file_enabled", &self.file_enabled())
            .field("max_file_size", &self.max_file_size_bytes())
            .field("info_path", &self.info_path)
            .field("warn_path", &self.warn_path)
            .finish()
    }
}
