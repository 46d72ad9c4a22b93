//! Shared logging setup for Sheetlink binaries.
//!
//! Stdout is the protocol channel when serving MCP, so every log line
//! goes to stderr, with an optional copy appended to a file under the
//! Sheetlink home directory.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "sheetlink=info,sheetlink_mcp=info,sheetlink_bridge=info";

/// Logging configuration for a Sheetlink binary.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Raise the stderr filter to match the file filter.
    pub verbose: bool,
    /// Also append to `~/.sheetlink/logs/<app>.log`.
    pub log_to_file: bool,
}

/// Initialize tracing with a stderr layer and an optional file layer.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let stderr_filter = if config.verbose {
        env_filter()
    } else {
        EnvFilter::new("warn")
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_filter(stderr_filter);

    let file_layer = if config.log_to_file {
        let log_path = ensure_logs_dir()?.join(format!("{}.log", config.app_name));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_filter(env_filter()),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

/// Sheetlink home directory: `$SHEETLINK_HOME` or `~/.sheetlink`.
pub fn sheetlink_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("SHEETLINK_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sheetlink")
}

/// Logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    sheetlink_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}
