//! Console sink writing to stdout and stderr

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::level::{Level, Stream, StreamRouting};

use super::{LevelGate, Sink, SinkKind};

type Writer = Box<dyn Write + Send>;

/// Synchronous sink for the process's standard streams
///
/// Lines routed to [`Stream::Info`] go to stdout, lines routed to
/// [`Stream::Warn`] go to stderr. Writes happen on the caller's thread.
pub struct ConsoleSink {
    level: LevelGate,
    routing: StreamRouting,
    /// Lock per stream so concurrent lines never interleave
    out: Mutex<Writer>,
    err: Mutex<Writer>,
}

impl ConsoleSink {
    /// Create a console sink on stdout/stderr
    pub fn new(level: Level, routing: StreamRouting) -> Self {
        Self::with_writers(level, routing, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Create a console sink over arbitrary writers (e.g. in-memory buffers)
    pub fn with_writers(level: Level, routing: StreamRouting, out: Writer, err: Writer) -> Self {
        Self {
            level: LevelGate::new(level),
            routing,
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Routing table in use
    pub fn routing(&self) -> &StreamRouting {
        &self.routing
    }

    fn writer(&self, stream: Stream) -> MutexGuard<'_, Writer> {
        let writer = match stream {
            Stream::Info => &self.out,
            Stream::Warn => &self.err,
        };
        writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, level: Level, line: &str) -> Result<()> {
        let mut writer = self.writer(self.routing.stream_for(level));
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.writer(Stream::Info).flush()?;
        self.writer(Stream::Warn).flush()?;
        Ok(())
    }
}
