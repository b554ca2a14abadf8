//! Logging setup: console output plus a log file next to the working
//! directory, with the previous run's file rotated aside by timestamp.

use anyhow::{Result, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_appender::non_blocking;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "school-scout.log";

// Keep the non-blocking writer guards alive for the process lifetime.
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Local-time formatter for log lines.
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Rename an existing log file with its modification timestamp so each run
/// starts a fresh file.
fn rotate_existing_log_file(log_dir: &Path) -> Result<()> {
    let log_file_path = log_dir.join(LOG_FILE);
    if !log_file_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("failed to read log file metadata: {e}"))?;
    let file_time = metadata
        .modified()
        .unwrap_or_else(|_| std::time::SystemTime::now());
    let datetime: chrono::DateTime<Local> = file_time.into();

    let file_stem = LOG_FILE.trim_end_matches(".log");
    let timestamped_name = format!("{}.{}.log", file_stem, datetime.format("%Y%m%dT%H%M%S"));
    let timestamped_path = log_dir.join(&timestamped_name);

    std::fs::rename(&log_file_path, &timestamped_path).map_err(|e| {
        anyhow!(
            "failed to rotate log file {} to {}: {e}",
            log_file_path.display(),
            timestamped_path.display()
        )
    })?;
    Ok(())
}

/// Initialize console + file logging. The filter honors `RUST_LOG`,
/// defaulting to `info` for this crate.
pub fn init_logging() -> Result<()> {
    let log_dir = PathBuf::from(LOG_DIR);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow!("failed to create log directory {}: {e}", log_dir.display()))?;
    rotate_existing_log_file(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (file_writer, guard) = non_blocking(file_appender);
    LOG_GUARDS
        .lock()
        .map_err(|_| anyhow!("log guard mutex poisoned"))?
        .push(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,school_scout=info"));

    let console_layer = fmt::layer()
        .with_timer(LocalTimeFormatter)
        .with_target(false);
    let file_layer = fmt::layer()
        .with_timer(LocalTimeFormatter)
        .with_writer(file_writer)
        .with_ansi(false);

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
