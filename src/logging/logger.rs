//! Structured logger with dry-run awareness and a closing run summary.
use std::path::{Path, PathBuf};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::utils::log_file_path;
use crate::place::PlacementStats;

/// Structured logger used by the command handlers.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/stagehand/<command>.log` (default `~/.cache/stagehand/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
}

#[allow(clippy::unused_self)]
impl Logger {
    /// Create a new logger.
    ///
    /// Only resolves the log file path for the run summary. The file and its
    /// directory are created by
    /// [`init_subscriber`](super::subscriber::init_subscriber); this
    /// constructor touches nothing on disk.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            log_file: log_file_path(command),
        }
    }

    /// The log file this run writes to, once a subscriber is installed.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_file
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Print the summary of a placement run.
    pub fn print_summary(&self, stats: &PlacementStats, dry_run: bool) {
        self.stage("Summary");

        let icon = if dry_run {
            "\x1b[37m~"
        } else if stats.changed() > 0 {
            "\x1b[32m✓"
        } else {
            "\x1b[2m·"
        };
        self.info(&format!("{icon} {}\x1b[0m", stats.summary(dry_run)));

        let path = self.log_path();
        if path.is_file() {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}
