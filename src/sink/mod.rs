//! Log sinks
//!
//! A sink is a destination for rendered lines. Every variant exposes the same
//! capability set so the logger can iterate its sinks uniformly.

mod console;
mod file;

pub use console::ConsoleSink;
pub use file::{stream_path, FileSink, FileSinkOptions};

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::Result;
use crate::level::Level;

/// Class of a sink, used by the logger's enable switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Console,
    File,
}

/// Destination for formatted log lines
pub trait Sink: Send + Sync {
    /// Class of this sink
    fn kind(&self) -> SinkKind;

    /// Minimum level this sink emits
    fn level(&self) -> Level;

    /// Change the minimum level
    fn set_level(&self, level: Level);

    /// Write one rendered line
    ///
    /// Callers check [`Sink::enabled`] first; `emit` does not filter.
    fn emit(&self, level: Level, line: &str) -> Result<()>;

    /// Release the sink's handles
    fn close(&self) -> Result<()>;

    /// Check whether a message at `level` passes this sink's gate
    fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }
}

/// Level gate shared by the sink variants
#[derive(Debug)]
pub(crate) struct LevelGate(AtomicU8);

impl LevelGate {
    pub(crate) fn new(level: Level) -> Self {
        Self(AtomicU8::new(level.as_u8()))
    }

    pub(crate) fn get(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, level: Level) {
        self.0.store(level.as_u8(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSink {
        gate: LevelGate,
        emitted: std::sync::Mutex<Vec<Level>>,
    }

    impl Sink for CountingSink {
        fn kind(&self) -> SinkKind {
            SinkKind::Console
        }

        fn level(&self) -> Level {
            self.gate.get()
        }

        fn set_level(&self, level: Level) {
            self.gate.set(level);
        }

        fn emit(&self, level: Level, _line: &str) -> Result<()> {
            self.emitted.lock().unwrap().push(level);
            Ok(())
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_enabled_gate_for_every_level_pair() {
        let sink = CountingSink {
            gate: LevelGate::new(Level::Debug),
            emitted: std::sync::Mutex::new(Vec::new()),
        };

        for configured in Level::ALL {
            sink.set_level(configured);
            for message in Level::ALL {
                assert_eq!(
                    sink.enabled(message),
                    message >= configured,
                    "sink at {} with message at {}",
                    configured,
                    message
                );
            }
        }
    }

    #[test]
    fn test_level_gate_set_and_get() {
        let gate = LevelGate::new(Level::Info);
        assert_eq!(gate.get(), Level::Info);
        gate.set(Level::Fatal);
        assert_eq!(gate.get(), Level::Fatal);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let sink: Box<dyn Sink> = Box::new(CountingSink {
            gate: LevelGate::new(Level::Warn),
            emitted: std::sync::Mutex::new(Vec::new()),
        });
        assert_eq!(sink.kind(), SinkKind::Console);
        assert!(!sink.enabled(Level::Info));
        sink.emit(Level::Error, "line\n").unwrap();
        sink.close().unwrap();
    }
}
