// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; a file layer when a log directory is given.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Log file written inside each run folder
pub const LOG_FILE_NAME: &str = "simulation.log";

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Keeps the file writer alive; logs are flushed when dropped
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder holding `simulation.log`, if file logging is on
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Default level directive (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
    /// Base directory for run folders; `None` disables file logging
    pub log_dir: Option<PathBuf>,
    /// Number of most recent run folders to keep
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            retention_runs: 10,
        }
    }
}

/// Initialize the global subscriber
///
/// With a log directory, creates:
/// ```text
/// <log_dir>/
///   └── run_20250101_120000/
///       └── simulation.log
/// ```
/// and removes run folders beyond `retention_runs`.
///
/// # Errors
///
/// Fails if the run folder cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    options: &LoggingOptions,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&options.level);
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter)
        .boxed();
    let mut layers = vec![console_layer];

    let mut file_guard = None;
    let mut run_dir = None;
    if let Some(base_log_dir) = &options.log_dir {
        let run_folder = create_run_folder(base_log_dir)?;
        cleanup_old_logs(base_log_dir, options.retention_runs)?;

        let file_appender = tracing_appender::rolling::never(&run_folder, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::try_new(&filter)?)
            .boxed();
        layers.push(file_layer);
        file_guard = Some(guard);
        run_dir = Some(run_folder);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        run_dir,
    })
}

/// Create a timestamped run folder under `base_log_dir`
pub fn create_run_folder(base_log_dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format(RUN_TIMESTAMP_FORMAT);
    let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    Ok(run_folder)
}

/// Remove all but the `retention_runs` most recent run folders
///
/// Entries whose names are not `run_<timestamp>` are left alone. Returns the
/// number of folders removed.
pub fn cleanup_old_logs(base_log_dir: &Path, retention_runs: usize) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(RUN_PREFIX))
            .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_TIMESTAMP_FORMAT).ok());
        if let Some(stamp) = stamp {
            runs.push((path, stamp));
        }
    }

    if runs.len() <= retention_runs {
        return Ok(0);
    }

    // Oldest first
    runs.sort_by_key(|(_, stamp)| *stamp);
    let to_remove = runs.len() - retention_runs;
    let mut removed = 0;
    for (path, _) in runs.iter().take(to_remove) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }
    Ok(removed)
}
