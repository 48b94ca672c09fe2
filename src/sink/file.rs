//! File sink writing to an info file and a warn file
//!
//! Lines are split by the routing table into `<file>-info.log` and
//! `<file>-warn.log`. Each file rotates independently, but both share the
//! logger's single write pipeline.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::level::{Level, Stream, StreamRouting};
use crate::pipeline::WritePipeline;
use crate::rotation::{ensure_directory, RetentionPolicy, RotatingFile};

use super::{LevelGate, Sink, SinkKind};

/// Path of the active file for `stream`: `<dir>/<base>-<suffix>.log`
pub fn stream_path(dir: &Path, base: &str, stream: Stream) -> PathBuf {
    dir.join(format!("{}-{}.log", base, stream.file_suffix()))
}

/// Settings for opening a [`FileSink`]
#[derive(Debug, Clone)]
pub struct FileSinkOptions {
    pub dir: PathBuf,
    pub base_name: String,
    pub routing: StreamRouting,
    pub backup_on_start: bool,
    pub retention: RetentionPolicy,
}

/// Asynchronous sink over a pair of rotating files
pub struct FileSink {
    level: LevelGate,
    routing: StreamRouting,
    info: RotatingFile,
    warn: RotatingFile,
    /// Rotation threshold, shared with the logger
    max_size: Arc<AtomicU64>,
    pipeline: Arc<WritePipeline>,
}

impl FileSink {
    /// Create the directory if needed and open both streams
    pub fn open(
        level: Level,
        options: FileSinkOptions,
        max_size: Arc<AtomicU64>,
        pipeline: Arc<WritePipeline>,
    ) -> Result<Self> {
        ensure_directory(&options.dir)?;

        let info = RotatingFile::open(
            stream_path(&options.dir, &options.base_name, Stream::Info),
            options.backup_on_start,
            options.retention,
        )?;
        let warn = RotatingFile::open(
            stream_path(&options.dir, &options.base_name, Stream::Warn),
            options.backup_on_start,
            options.retention,
        )?;

        tracing::debug!(
            "Opened log files {} and {}",
            info.path().display(),
            warn.path().display()
        );

        Ok(Self {
            level: LevelGate::new(level),
            routing: options.routing,
            info,
            warn,
            max_size,
            pipeline,
        })
    }

    /// Rotating file backing `stream`
    pub fn stream(&self, stream: Stream) -> &RotatingFile {
        match stream {
            Stream::Info => &self.info,
            Stream::Warn => &self.warn,
        }
    }

    /// Path of the active file backing `stream`
    pub fn path(&self, stream: Stream) -> &Path {
        self.stream(stream).path()
    }
}

impl Sink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, level: Level, line: &str) -> Result<()> {
        let target = self.stream(self.routing.stream_for(level));
        target.write(
            line.to_owned(),
            self.max_size.load(Ordering::Relaxed),
            &self.pipeline,
        )
    }

    fn close(&self) -> Result<()> {
        self.info.close();
        self.warn.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn open_sink(dir: &Path, max_size: u64) -> (FileSink, Arc<WritePipeline>) {
        let pipeline = Arc::new(WritePipeline::start(64).unwrap());
        let options = FileSinkOptions {
            dir: dir.to_path_buf(),
            base_name: "test".to_string(),
            routing: StreamRouting::default(),
            backup_on_start: true,
            retention: RetentionPolicy::default(),
        };
        let sink = FileSink::open(
            Level::Debug,
            options,
            Arc::new(AtomicU64::new(max_size)),
            Arc::clone(&pipeline),
        )
        .unwrap();
        (sink, pipeline)
    }

    #[test]
    fn test_stream_path_layout() {
        let dir = Path::new("/var/log/app");
        assert_eq!(
            stream_path(dir, "test", Stream::Info),
            PathBuf::from("/var/log/app/test-info.log")
        );
        assert_eq!(
            stream_path(dir, "test", Stream::Warn),
            PathBuf::from("/var/log/app/test-warn.log")
        );
    }

    #[test]
    fn test_open_creates_directory_and_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("logs");

        let (sink, _pipeline) = open_sink(&dir, u64::MAX);

        assert!(dir.is_dir());
        assert!(sink.path(Stream::Info).exists());
        assert!(sink.path(Stream::Warn).exists());
        assert_eq!(sink.kind(), SinkKind::File);
    }

    #[test]
    fn test_emit_routes_by_level() {
        let temp_dir = TempDir::new().unwrap();
        let (sink, pipeline) = open_sink(temp_dir.path(), u64::MAX);

        sink.emit(Level::Debug, "debug\n").unwrap();
        sink.emit(Level::Warn, "warn\n").unwrap();
        sink.emit(Level::Error, "error\n").unwrap();
        sink.emit(Level::Fatal, "fatal\n").unwrap();
        pipeline.wait_idle();

        assert_eq!(
            fs::read_to_string(sink.path(Stream::Info)).unwrap(),
            "debug\nwarn\n"
        );
        assert_eq!(
            fs::read_to_string(sink.path(Stream::Warn)).unwrap(),
            "error\nfatal\n"
        );
    }

    #[test]
    fn test_streams_rotate_independently() {
        let temp_dir = TempDir::new().unwrap();
        let (sink, pipeline) = open_sink(temp_dir.path(), 8);

        sink.emit(Level::Info, "0123456789\n").unwrap();
        sink.emit(Level::Info, "0123456789\n").unwrap();
        sink.emit(Level::Error, "short\n").unwrap();
        pipeline.wait_idle();

        assert_eq!(crate::rotation::list_backups(sink.path(Stream::Info)).unwrap().len(), 1);
        assert!(crate::rotation::list_backups(sink.path(Stream::Warn)).unwrap().is_empty());
    }

    #[test]
    fn test_threshold_change_applies_to_next_write() {
        let temp_dir = TempDir::new().unwrap();
        let (sink, pipeline) = open_sink(temp_dir.path(), u64::MAX);

        sink.emit(Level::Info, "first\n").unwrap();
        sink.max_size.store(1, Ordering::Relaxed);
        sink.emit(Level::Info, "second\n").unwrap();
        pipeline.wait_idle();

        assert_eq!(fs::read_to_string(sink.path(Stream::Info)).unwrap(), "second\n");
    }

    #[test]
    fn test_close_rejects_further_writes() {
        let temp_dir = TempDir::new().unwrap();
        let (sink, _pipeline) = open_sink(temp_dir.path(), u64::MAX);

        sink.close().unwrap();
        assert!(sink.stream(Stream::Info).is_closed());
        assert!(sink.stream(Stream::Warn).is_closed());
        assert!(sink.emit(Level::Info, "late\n").is_err());
    }
}
