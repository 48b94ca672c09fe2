//! Backup file naming
//!
//! A rotated-out file is renamed to `<prefix>-<timestamp><ext>` next to the
//! active file, where `<prefix>` and `<ext>` come from splitting the active
//! file name at its last `.`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};

/// Timestamp layout for backup names (sortable and filesystem-safe)
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Split a file name into `(prefix, ext)` at its last `.`
///
/// The extension keeps its leading dot; names without one get an empty extension.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name.split_at(pos),
        _ => (file_name, ""),
    }
}

/// Build the backup path for `active` at time `now`
///
/// If a file with that name already exists a counter is appended
/// (`-1`, `-2`, ...) until the name is free, so two rotations within the same
/// millisecond never overwrite each other.
pub fn backup_path(active: &Path, now: DateTime<Local>) -> PathBuf {
    let dir = active.parent().unwrap_or_else(|| Path::new(""));
    let file_name = active
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (prefix, ext) = split_file_name(&file_name);
    let timestamp = now.format(BACKUP_TIME_FORMAT).to_string();

    let candidate = dir.join(format!("{}-{}{}", prefix, timestamp, ext));
    if !candidate.exists() {
        return candidate;
    }

    let mut counter: u32 = 1;
    loop {
        let candidate = dir.join(format!("{}-{}-{}{}", prefix, timestamp, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Sort key of a backup name: its timestamp, then its collision counter
pub type BackupKey = (NaiveDateTime, u32);

/// Parse `<prefix>-<timestamp>[-N]<ext>` into its [`BackupKey`]
///
/// Returns `None` for any name that was not produced by [`backup_path`] for
/// the active file `(prefix, ext)`.
pub fn parse_backup_name(file_name: &str, prefix: &str, ext: &str) -> Option<BackupKey> {
    let middle = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(ext)?;

    if let Some((stamp, counter)) = middle.rsplit_once('-') {
        if !counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(time) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
                return Some((time, counter.parse().ok()?));
            }
        }
    }

    NaiveDateTime::parse_from_str(middle, BACKUP_TIME_FORMAT)
        .ok()
        .map(|time| (time, 0))
}
