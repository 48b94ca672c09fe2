//! Shared helpers for unit tests

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::LoggerConfig;
use crate::level::{Level, StreamRouting};
use crate::sink::ConsoleSink;

/// Cloneable in-memory writer for capturing console output
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console sink writing into two capture buffers (stdout, stderr)
pub(crate) fn capture_console(level: Level) -> (ConsoleSink, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let sink = ConsoleSink::with_writers(
        level,
        StreamRouting::default(),
        Box::new(out.clone()),
        Box::new(err.clone()),
    );
    (sink, out, err)
}

/// Config logging into `dir` with base name `test`
pub(crate) fn test_config(dir: &Path) -> LoggerConfig {
    LoggerConfig::new(dir, "test")
}
