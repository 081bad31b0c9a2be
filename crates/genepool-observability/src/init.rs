// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for genepool
//!
//! Installs a global `tracing` subscriber with a console layer and, with the
//! `file-logging` feature, a daily-rolling JSON log file per run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging initialization result
///
/// Keep it alive for as long as logs should be written; file writers flush
/// when it is dropped.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory of this run's log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the filter shared by every layer
///
/// `RUST_LOG`-style directives: debug for flagged crates, `config.level`
/// for everything else.
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string_with_default(&config.level);
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Initialize logging
///
/// Log folder structure with `file-logging` and `config.file_path` set:
/// ```text
/// <file_path>/
///   └── run_20250101_120000/
///       └── genepool.log.2025-01-01
/// ```
///
/// # Errors
/// Fails if the filter is invalid, the log directory cannot be created, or a
/// global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_filter(debug_flags, config)?;
    #[cfg_attr(not(feature = "file-logging"), allow(unused_mut))]
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format, env_filter.clone())];

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = match &config.file_path {
        Some(base_log_dir) => {
            let (layer, guard, run_folder) = file::file_layer(base_log_dir, env_filter)?;
            layers.push(layer);
            (vec![guard], Some(run_folder))
        }
        None => (Vec::new(), None),
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if !cfg!(feature = "file-logging") {
        if let Some(path) = &config.file_path {
            tracing::warn!(
                "[OBSERVABILITY] Ignoring log directory {}: built without file-logging",
                path.display()
            );
        }
    }
    tracing::debug!(
        "[OBSERVABILITY] Logging initialized (filter: {})",
        debug_flags.to_filter_string_with_default(&config.level)
    );

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);
    match format {
        LogFormat::Text => layer.with_filter(filter).boxed(),
        LogFormat::Json => layer.json().with_filter(filter).boxed(),
    }
}

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use chrono::{NaiveDateTime, Utc};
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_appender::rolling;
    use tracing_subscriber::{EnvFilter, Layer};

    use super::BoxedLayer;

    /// Most recent run folders kept under the base log directory
    pub(super) const RETAINED_RUNS: usize = 10;

    const RUN_PREFIX: &str = "run_";
    const RUN_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

    pub(super) fn file_layer(
        base_log_dir: &Path,
        filter: EnvFilter,
    ) -> Result<(BoxedLayer, WorkerGuard, PathBuf)> {
        let timestamp = Utc::now().format(RUN_TIMESTAMP);
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
        cleanup_old_runs(base_log_dir, RETAINED_RUNS)?;

        let appender = rolling::daily(&run_folder, "genepool.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(filter)
            .boxed();
        Ok((layer, guard, run_folder))
    }

    /// Removes all but the `keep` newest run folders.
    pub(super) fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<()> {
        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let started = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix(RUN_PREFIX))
                .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP).ok());
            if let Some(started) = started {
                runs.push((path, started));
            }
        }

        // newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));
        for (path, _) in runs.iter().skip(keep) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cleanup_keeps_newest_runs() {
            let dir = tempfile::tempdir().unwrap();
            for stamp in ["20250101_000000", "20250102_000000", "20250103_000000"] {
                std::fs::create_dir(dir.path().join(format!("run_{}", stamp))).unwrap();
            }
            std::fs::create_dir(dir.path().join("unrelated")).unwrap();

            cleanup_old_runs(dir.path(), 2).unwrap();

            assert!(!dir.path().join("run_20250101_000000").exists());
            assert!(dir.path().join("run_20250102_000000").exists());
            assert!(dir.path().join("run_20250103_000000").exists());
            assert!(dir.path().join("unrelated").exists());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-genepool-storage".to_string()]);
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        let filter = build_filter(&flags, &config).unwrap();
        assert!(filter.to_string().contains("genepool_storage=debug"));

        let config = LoggingConfig {
            level: "genepool=loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&CrateDebugFlags::default(), &config).is_err());
    }

    #[test]
    fn test_init_logging_only_once() {
        let flags = CrateDebugFlags::default();
        let guard = init_logging_default(&flags).unwrap();
        assert!(guard.log_dir().is_none());
        assert!(init_logging_default(&flags).is_err());
    }
}
