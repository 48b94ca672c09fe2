//! Backup retention management
//!
//! Handles cleanup of rotated-out backups by age and by count.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::backup::{parse_backup_name, split_file_name};
use crate::error::Result;

/// Limits on the backups kept next to an active file
///
/// Backups are removed to satisfy *all* configured limits. If both fields are
/// `None`, backups are never deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Maximum number of backups to keep per stream
    #[serde(default)]
    pub max_backups: Option<usize>,
    /// Maximum age of backups in days
    #[serde(default)]
    pub max_age_days: Option<u64>,
}

impl RetentionPolicy {
    /// Specifies the maximum number of backups.
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = Some(max_backups);
        self
    }

    /// Specifies the maximum backup age.
    pub fn with_max_age_days(mut self, max_age_days: u64) -> Self {
        self.max_age_days = Some(max_age_days);
        self
    }

    /// Check whether this policy can ever delete anything
    pub fn is_unlimited(&self) -> bool {
        self.max_backups.is_none() && self.max_age_days.is_none()
    }
}

/// List the backups of `active`, oldest first
pub fn list_backups(active: &Path) -> Result<Vec<PathBuf>> {
    let Some(dir) = active.parent() else {
        return Ok(Vec::new());
    };
    let file_name = active
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (prefix, ext) = split_file_name(&file_name);

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;

        // Only process backups of this stream
        let Some(key) = entry
            .file_name()
            .to_str()
            .and_then(|name| parse_backup_name(name, prefix, ext))
        else {
            continue;
        };

        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            backups.push((key, entry.path()));
        }
    }

    // Name order is not time order once a collision counter is appended
    backups.sort();
    Ok(backups.into_iter().map(|(_, path)| path).collect())
}

/// Apply `policy` to the backups of `active`
///
/// Returns the number of files deleted.
pub fn prune_backups(active: &Path, policy: &RetentionPolicy) -> Result<usize> {
    if policy.is_unlimited() {
        return Ok(0);
    }

    let mut backups = list_backups(active)?;
    let mut deleted_count = 0;

    if let Some(days) = policy.max_age_days {
        let retention_duration = Duration::from_secs(days.saturating_mul(24 * 60 * 60));
        let cutoff = SystemTime::now()
            .checked_sub(retention_duration)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        backups.retain(|path| {
            let expired = fs::metadata(path)
                .and_then(|m| m.modified())
                .map(|modified| modified < cutoff)
                .unwrap_or(false);
            if expired && fs::remove_file(path).is_ok() {
                deleted_count += 1;
                return false;
            }
            true
        });
    }

    if let Some(max_backups) = policy.max_backups {
        let excess = backups.len().saturating_sub(max_backups);
        for path in backups.iter().take(excess) {
            if fs::remove_file(path).is_ok() {
                deleted_count += 1;
            }
        }
    }

    Ok(deleted_count)
}
