use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use splitlog::config::{self, LoggerConfig};
use splitlog::{Level, Stream};

fn main() -> Result<()> {
    // Diagnostics from the library itself go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "splitlog=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config()?;
    splitlog::init(config).context("Failed to initialize logger")?;

    splitlog::set_console_enabled(true)?;
    for level in Level::ALL {
        splitlog::log!(level, "console and file at {}", level);
    }

    splitlog::set_console_enabled(false)?;
    splitlog::debug!("file only");
    splitlog::info!("file only");
    splitlog::warn!("file only");
    splitlog::error!("file only, warn stream");
    splitlog::fatal!("file only, warn stream; still running");

    let logger = splitlog::try_logger()?;
    let info_path = logger.file_path(Stream::Info).to_path_buf();
    let warn_path = logger.file_path(Stream::Warn).to_path_buf();
    splitlog::flush().context("Failed to flush logger")?;

    for path in [info_path, warn_path] {
        let size = std::fs::metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        println!("{}: {} bytes", path.display(), size);
    }

    Ok(())
}

/// `$SPLITLOG_CONFIG`, then ~/.splitlog/config.toml, then `./logs/demo-*.log`
fn load_config() -> Result<LoggerConfig> {
    let path = std::env::var_os("SPLITLOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(config::config_file_path);

    if path.exists() {
        tracing::info!("Loading config from {}", path.display());
        return LoggerConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    Ok(LoggerConfig::new("logs", "demo"))
}
