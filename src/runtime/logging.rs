//! Tracing setup. The TUI owns the terminal, so records go to a file.

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;

pub const LOG_ENV: &str = "SOUNDLOOP_LOG";
const LOG_FILE: &str = "soundloop.log";

/// Install the global subscriber.
///
/// Returns the guard that flushes the file writer; hold it until exit. `None`
/// means the log file could not be opened and records go to stderr.
pub fn init(settings: &LoggingSettings, data_dir: &Path) -> Option<WorkerGuard> {
    let filter = build_filter(env::var(LOG_ENV).ok().as_deref(), &settings.filter);
    let path = log_path(settings, data_dir);

    match file_appender(&path) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            let _ = tracing_subscriber::registry()
                .with(file_layer)
                .with(filter)
                .try_init();
            tracing::debug!(log_file = ?path, "logging initialized");
            Some(guard)
        }
        Err(e) => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true);
            let _ = tracing_subscriber::registry()
                .with(stderr_layer)
                .with(filter)
                .try_init();
            tracing::warn!(log_file = ?path, error = %e, "cannot open log file, logging to stderr");
            None
        }
    }
}

/// `SOUNDLOOP_LOG` wins over the configured directive; a directive that does
/// not parse falls back to `info`.
pub(crate) fn build_filter(env_directive: Option<&str>, configured: &str) -> EnvFilter {
    let directive = env_directive
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(configured);
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub(crate) fn log_path(settings: &LoggingSettings, data_dir: &Path) -> PathBuf {
    settings
        .file
        .clone()
        .unwrap_or_else(|| data_dir.join(LOG_FILE))
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(LOG_FILE);
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)?;
    Ok(appender)
}
