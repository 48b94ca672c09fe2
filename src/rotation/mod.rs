//! Size-based rotation of active log files
//!
//! Each [`RotatingFile`] owns one active file path. Before every enqueue it
//! compares the stream's size with the configured threshold and, when the
//! threshold is reached, renames the file to a timestamped backup and reopens
//! a fresh file at the same path. Jobs already queued against the old handle
//! still land in the renamed backup, since the handle follows the file.

mod backup;
mod retention;

pub use backup::{backup_path, parse_backup_name, split_file_name, BackupKey, BACKUP_TIME_FORMAT};
pub use retention::{list_backups, prune_backups, RetentionPolicy};

use std::fs::{self, File, OpenOptions, Permissions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;

use crate::error::{Error, Result};
use crate::pipeline::{WriteJob, WritePipeline};

/// Create `dir` if it is missing (single level, not recursive)
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    match fs::create_dir(dir) {
        Ok(()) => {
            tracing::debug!("Created log directory {}", dir.display());
            Ok(())
        }
        // Lost a race with another creator
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(Error::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Open `path` for appending, applying `permissions` when given
fn open_append(path: &Path, permissions: Option<Permissions>) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    Ok(file)
}

/// Handle and logical size of the active file
#[derive(Debug)]
struct ActiveFile {
    /// `None` once the stream has been closed
    file: Option<Arc<File>>,
    /// Bytes on disk at open time plus bytes enqueued since
    size: u64,
}

/// One active log file with size-triggered rotation
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    retention: RetentionPolicy,
    active: Mutex<ActiveFile>,
    /// Set by the writer thread when a queued write fails
    failed: Arc<AtomicBool>,
}

impl RotatingFile {
    /// Open the active file at `path`
    ///
    /// With `backup_on_start`, a non-empty file left by a previous run is
    /// rotated into a backup first; otherwise new lines are appended to it.
    pub fn open(path: PathBuf, backup_on_start: bool, retention: RetentionPolicy) -> Result<Self> {
        let rotating = Self {
            path,
            retention,
            active: Mutex::new(ActiveFile {
                file: None,
                size: 0,
            }),
            failed: Arc::new(AtomicBool::new(false)),
        };

        let existing = fs::metadata(&rotating.path).ok().filter(|m| m.is_file());
        let mut active = rotating.lock();
        match existing {
            Some(meta) if backup_on_start && meta.len() > 0 => {
                rotating.rotate(&mut active)?;
            }
            Some(meta) => {
                active.file = Some(Arc::new(open_append(&rotating.path, None)?));
                active.size = meta.len();
            }
            None => {
                active.file = Some(Arc::new(open_append(&rotating.path, None)?));
            }
        }
        drop(active);

        Ok(rotating)
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logical size of the active file, including queued bytes
    pub fn size(&self) -> u64 {
        self.lock().size
    }

    /// Check if the stream has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().file.is_none()
    }

    /// Check if a queued write to this stream has failed
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Rotate if needed, then hand `line` to the pipeline
    ///
    /// The stream lock is held across the size check, any rotation and the
    /// enqueue, so the queue sees this stream's lines in call order.
    pub fn write(&self, line: String, max_size: u64, pipeline: &WritePipeline) -> Result<()> {
        let mut active = self.lock();
        if active.file.is_none() {
            return Err(Error::SinkClosed);
        }
        if self.is_failed() {
            return Err(Error::SinkFailed {
                path: self.path.clone(),
            });
        }

        if active.size >= max_size {
            self.rotate(&mut active)?;
        }

        let file = active.file.as_ref().map(Arc::clone).ok_or(Error::SinkClosed)?;
        let len = line.len() as u64;
        pipeline.submit(WriteJob {
            file,
            line,
            failed: Arc::clone(&self.failed),
        })?;
        active.size += len;
        Ok(())
    }

    /// Force a rotation regardless of size
    ///
    /// Returns the backup path the old file was moved to.
    pub fn rotate_now(&self) -> Result<PathBuf> {
        let mut active = self.lock();
        if active.file.is_none() {
            return Err(Error::SinkClosed);
        }
        self.rotate(&mut active)
    }

    /// Drop the active handle; queued jobs keep their own reference
    pub fn close(&self) {
        self.lock().file = None;
    }

    fn lock(&self) -> MutexGuard<'_, ActiveFile> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn rotate(&self, active: &mut ActiveFile) -> Result<PathBuf> {
        let permissions = fs::metadata(&self.path).ok().map(|m| m.permissions());
        let backup = backup_path(&self.path, Local::now());

        fs::rename(&self.path, &backup).map_err(|source| Error::Rotation {
            path: self.path.clone(),
            source,
        })?;

        let file = open_append(&self.path, permissions)?;
        active.file = Some(Arc::new(file));
        active.size = 0;

        tracing::info!(
            "Rotated {} to {}",
            self.path.display(),
            backup.display()
        );

        match prune_backups(&self.path, &self.retention) {
            Ok(count) if count > 0 => {
                tracing::info!("Cleaned up {} old backups of {}", count, self.path.display());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to prune backups of {}: {}", self.path.display(), e);
            }
        }

        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_ensure_directory_creates_single_level() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("logs");

        ensure_directory(&dir).unwrap();
        assert!(dir.is_dir());

        // Second call is not an error
        ensure_directory(&dir).unwrap();
    }

    #[test]
    fn test_ensure_directory_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("missing").join("logs");

        let err = ensure_directory(&dir).unwrap_err();
        assert!(matches!(err, Error::CreateDirectory { .. }));
        assert!(!dir.exists());
    }

    #[test]
    fn test_open_appends_without_backup_on_start() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        fs::write(&path, "previous\n").unwrap();

        let rotating = RotatingFile::open(path.clone(), false, RetentionPolicy::default()).unwrap();
        assert_eq!(rotating.size(), 9);
        assert_eq!(files_in(temp_dir.path()), vec!["app-info.log"]);
    }

    #[test]
    fn test_open_backs_up_previous_run() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        fs::write(&path, "previous\n").unwrap();

        let rotating = RotatingFile::open(path.clone(), true, RetentionPolicy::default()).unwrap();
        assert_eq!(rotating.size(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        let backups = list_backups(&path).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "previous\n");
    }

    #[test]
    fn test_open_skips_backup_of_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        fs::write(&path, "").unwrap();

        RotatingFile::open(path.clone(), true, RetentionPolicy::default()).unwrap();
        assert!(list_backups(&path).unwrap().is_empty());
    }

    #[test]
    fn test_write_rotates_at_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        let pipeline = WritePipeline::start(16).unwrap();
        let rotating = RotatingFile::open(path.clone(), true, RetentionPolicy::default()).unwrap();

        rotating.write("aaaaaaaaa\n".into(), 10, &pipeline).unwrap();
        rotating.write("bbbbbbbbb\n".into(), 10, &pipeline).unwrap();
        pipeline.wait_idle();

        let backups = list_backups(&path).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "aaaaaaaaa\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "bbbbbbbbb\n");
        assert_eq!(rotating.size(), 10);
    }

    #[test]
    fn test_queued_lines_follow_rotated_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        let pipeline = WritePipeline::start(16).unwrap();
        let rotating = RotatingFile::open(path.clone(), true, RetentionPolicy::default()).unwrap();

        // Queued before rotation, possibly written after it
        rotating.write("before\n".into(), u64::MAX, &pipeline).unwrap();
        let backup = rotating.rotate_now().unwrap();
        rotating.write("after\n".into(), u64::MAX, &pipeline).unwrap();
        pipeline.wait_idle();

        assert_eq!(fs::read_to_string(&backup).unwrap(), "before\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "after\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_rotation_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        let rotating = RotatingFile::open(path.clone(), true, RetentionPolicy::default()).unwrap();
        fs::set_permissions(&path, Permissions::from_mode(0o640)).unwrap();

        rotating.rotate_now().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_write_after_close_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        let pipeline = WritePipeline::start(1).unwrap();
        let rotating = RotatingFile::open(path, true, RetentionPolicy::default()).unwrap();

        rotating.close();
        assert!(rotating.is_closed());
        let err = rotating.write("late\n".into(), u64::MAX, &pipeline).unwrap_err();
        assert!(matches!(err, Error::SinkClosed));
    }

    #[test]
    fn test_rotation_applies_retention() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        let pipeline = WritePipeline::start(16).unwrap();
        let retention = RetentionPolicy::default().with_max_backups(2);
        let rotating = RotatingFile::open(path.clone(), true, retention).unwrap();

        for _ in 0..4 {
            rotating.write("x\n".into(), u64::MAX, &pipeline).unwrap();
            pipeline.wait_idle();
            rotating.rotate_now().unwrap();
        }

        assert_eq!(list_backups(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_write_disables_stream() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app-info.log");
        let pipeline = WritePipeline::start(16).unwrap();
        let rotating = RotatingFile::open(path.clone(), true, RetentionPolicy::default()).unwrap();
        // Swap in a read-only handle so the writer thread's write fails
        rotating.lock().file = Some(Arc::new(File::open(&path).unwrap()));

        rotating.write("lost\n".into(), u64::MAX, &pipeline).unwrap();
        pipeline.wait_idle();

        assert!(rotating.is_failed());
        let err = rotating.write("next\n".into(), u64::MAX, &pipeline).unwrap_err();
        assert!(matches!(err, Error::SinkFailed { .. }));
        assert_eq!(pipeline.pending(), 0);
    }
}
