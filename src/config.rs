//! Configuration for the logging core

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::level::{Level, StreamRouting};
use crate::rotation::RetentionPolicy;
use crate::sink::FileSinkOptions;

/// One mebibyte
pub const MEGABYTE: u64 = 1024 * 1024;

/// Logger configuration
///
/// `path` and `file` are required; every other field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum level for every sink (default: debug)
    #[serde(default)]
    pub level: Level,

    /// Directory holding the log files; `~` and `$VARS` are expanded
    #[serde(default)]
    pub path: Option<String>,

    /// Base file name, e.g. `app` for `app-info.log` / `app-warn.log`
    #[serde(default)]
    pub file: Option<String>,

    /// Capacity of the async write queue (default: 10000)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Rotation threshold per file in bytes (default: 100 MiB)
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Whether console output starts enabled (default: false)
    #[serde(default)]
    pub console: bool,

    /// Whether file output starts enabled (default: true)
    #[serde(default = "default_true")]
    pub file_enabled: bool,

    /// Level-to-stream table for the console (stdout / stderr)
    #[serde(default)]
    pub console_routing: StreamRouting,

    /// Level-to-stream table for the files (info file / warn file)
    #[serde(default)]
    pub file_routing: StreamRouting,

    /// Move a non-empty file left by a previous run to a backup on start (default: true)
    #[serde(default = "default_true")]
    pub backup_on_start: bool,

    /// Limits on rotated-out backups (default: keep everything)
    #[serde(default)]
    pub retention: RetentionPolicy,
}

fn default_buffer_size() -> usize {
    10_000
}

fn default_max_file_size_bytes() -> u64 {
    100 * MEGABYTE
}

fn default_true() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::default(),
            path: None,
            file: None,
            buffer_size: default_buffer_size(),
            max_file_size_bytes: default_max_file_size_bytes(),
            console: false,
            file_enabled: true,
            console_routing: StreamRouting::default(),
            file_routing: StreamRouting::default(),
            backup_on_start: true,
            retention: RetentionPolicy::default(),
        }
    }
}

impl LoggerConfig {
    /// Create a configuration with the required directory and base name
    pub fn new(path: impl AsRef<Path>, file: impl Into<String>) -> Self {
        Self {
            path: Some(path.as_ref().to_string_lossy().into_owned()),
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("failed to parse config: {}", e)))
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("failed to serialize config: {}", e)))
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_max_file_size_bytes(mut self, max_file_size_bytes: u64) -> Self {
        self.max_file_size_bytes = max_file_size_bytes;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_file_enabled(mut self, file_enabled: bool) -> Self {
        self.file_enabled = file_enabled;
        self
    }

    pub fn with_console_routing(mut self, routing: StreamRouting) -> Self {
        self.console_routing = routing;
        self
    }

    pub fn with_file_routing(mut self, routing: StreamRouting) -> Self {
        self.file_routing = routing;
        self
    }

    pub fn with_backup_on_start(mut self, backup_on_start: bool) -> Self {
        self.backup_on_start = backup_on_start;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Log directory with `~` and environment variables expanded
    pub fn log_dir(&self) -> Result<PathBuf> {
        let raw = required(&self.path, "path")?;
        let expanded = shellexpand::full(raw)
            .map_err(|e| Error::Configuration(format!("invalid log path '{}': {}", raw, e)))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Base file name
    pub fn base_name(&self) -> Result<&str> {
        required(&self.file, "file")
    }

    /// Check every required and bounded setting
    pub fn validate(&self) -> Result<()> {
        self.log_dir()?;
        let base = self.base_name()?;
        if base.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "file '{}' must be a bare name, not a path",
                base
            )));
        }
        if self.buffer_size == 0 {
            return Err(Error::Configuration(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.max_file_size_bytes == 0 {
            return Err(Error::Configuration(
                "max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for opening the file sink
    pub(crate) fn file_sink_options(&self) -> Result<FileSinkOptions> {
        Ok(FileSinkOptions {
            dir: self.log_dir()?,
            base_name: self.base_name()?.to_string(),
            routing: self.file_routing,
            backup_on_start: self.backup_on_start,
            retention: self.retention,
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Configuration(format!("missing required setting '{}'", name))),
    }
}

/// Get the base configuration directory (~/.splitlog)
/// Falls back to ./.splitlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".splitlog"))
        .unwrap_or_else(|| PathBuf::from(".splitlog"))
}

/// Get the path to the default config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
