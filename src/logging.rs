//! Logging setup for embedders of the chain follower.
//!
//! The engine itself logs through the ambient `tracing` dispatcher; this
//! module provides the subscriber setup a node process typically wants:
//! console output, optional file output with archive rotation, and an
//! `EnvFilter` that honors `RUST_LOG`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{LoggingError, LoggingResult};

/// Prefix of archived log files.
const ARCHIVE_PREFIX: &str = "umbra-follower.";
/// Name of the log file of the running process.
const ACTIVE_LOG_NAME: &str = "current.log";

/// Keeps buffered log output flushing until dropped.
///
/// Hold this for the lifetime of the process; dropping it flushes any
/// buffered entries to disk.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level filter; `None` defers to `RUST_LOG`, falling back to INFO.
    pub level: Option<LevelFilter>,
    /// Whether to log to stderr.
    pub console: bool,
    /// Optional file output.
    pub file: Option<LogFileConfig>,
}

/// Configuration for log file output.
#[derive(Debug, Clone)]
pub struct LogFileConfig {
    /// Directory holding the active log and its archives.
    pub log_dir: PathBuf,
    /// Number of archived files to keep.
    pub max_archives: usize,
}

/// Initialize console-only logging at the given level.
pub fn init_console_logging(level: LevelFilter) -> LoggingResult<LoggingGuard> {
    init_logging(LoggingConfig {
        level: Some(level),
        console: true,
        file: None,
    })
}

/// Initialize logging from `config`.
///
/// Returns a [`LoggingGuard`] to keep alive for the duration of the
/// process. With neither console nor file output configured, tracing
/// macros become no-ops and an inert guard is returned.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingGuard> {
    if !config.console && config.file.is_none() {
        return Ok(LoggingGuard {
            _worker_guard: None,
        });
    }

    let env_filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string())),
    };

    let (file_layer, guard) = match config.file {
        Some(ref file_config) => {
            let (writer, guard) = open_log_file(file_config)?;
            let layer = fmt::layer().with_target(true).with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = config.console.then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))?;

    Ok(LoggingGuard {
        _worker_guard: guard,
    })
}

/// Prepare the log directory and open the active log file.
///
/// Archives the previous run's log, prunes old archives down to the
/// configured count, then creates a fresh active file behind a
/// non-blocking writer.
fn open_log_file(config: &LogFileConfig) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.log_dir)?;
    archive_previous_log(&config.log_dir)?;
    prune_archives(&config.log_dir, config.max_archives)?;

    let file = File::create(config.log_dir.join(ACTIVE_LOG_NAME))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Rename a leftover active log to a dated archive name.
///
/// The archive carries the file's modification time, e.g.
/// `umbra-follower.2026-03-01.091500.log`; a numeric suffix resolves
/// collisions.
fn archive_previous_log(log_dir: &Path) -> LoggingResult<()> {
    let active = log_dir.join(ACTIVE_LOG_NAME);
    if !active.exists() {
        return Ok(());
    }

    let stamp = file_mtime(&active).unwrap_or_else(Local::now).format("%Y-%m-%d.%H%M%S");
    let mut target = log_dir.join(format!("{}{}.log", ARCHIVE_PREFIX, stamp));
    if target.exists() {
        target = (1..=999)
            .map(|n| log_dir.join(format!("{}{}-{}.log", ARCHIVE_PREFIX, stamp, n)))
            .find(|path| !path.exists())
            .ok_or_else(|| {
                LoggingError::RotationFailed("archive name space exhausted".to_string())
            })?;
    }

    fs::rename(&active, &target).map_err(|e| LoggingError::RotationFailed(e.to_string()))
}

/// Delete the oldest archives until at most `max_archives` remain.
///
/// Only files named `umbra-follower.*.log` are considered; the active log
/// is never touched.
fn prune_archives(log_dir: &Path, max_archives: usize) -> LoggingResult<()> {
    let mut archives: Vec<_> = fs::read_dir(log_dir)
        .map_err(|e| LoggingError::RotationFailed(format!("cannot read log dir: {}", e)))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    if archives.len() <= max_archives {
        return Ok(());
    }

    archives.sort_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok());

    let excess = archives.len() - max_archives;
    for entry in archives.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(entry.path()) {
            tracing::warn!("could not remove old log file {:?}: {}", entry.path(), e);
        }
    }

    Ok(())
}

fn file_mtime(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::from(modified))
}
