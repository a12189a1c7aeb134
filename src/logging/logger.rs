//! Logger facade over [`tracing`] that also records stage outcomes.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, StageEntry, StageStatus};
use super::utils::log_file_path;

/// Order and colour of each status in the summary.
const SUMMARY_ORDER: [(StageStatus, &str, &str); 5] = [
    (StageStatus::Ok, "✓", "\x1b[32m"),
    (StageStatus::Failed, "✗", "\x1b[31m"),
    (StageStatus::Skipped, "○", "\x1b[33m"),
    (StageStatus::DryRun, "~", "\x1b[37m"),
    (StageStatus::NotApplicable, "·", "\x1b[2m"),
];

/// Console and file logger with a record of every stage's outcome.
///
/// Every message is also appended to `$XDG_CACHE_HOME/devsetup/<command>.log`
/// by the file layer installed in
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    stages: Mutex<Vec<StageEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`; only remembers where its log file lives.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_path(log_file_path(command))
    }

    /// Logger reporting `path` as its log file.
    #[must_use]
    pub const fn with_log_path(path: Option<PathBuf>) -> Self {
        Self {
            stages: Mutex::new(Vec::new()),
            log_file: path,
        }
    }

    /// Recorded stage outcomes, in execution order.
    #[must_use]
    pub fn stage_entries(&self) -> Vec<StageEntry> {
        self.stages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error (console: stderr).
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning (console: stderr).
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: super::STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console shows it only with `-v`).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log what a dry run would have done.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: super::DRY_RUN_TARGET, "{msg}");
    }

    /// Remember how a stage ended for [`print_summary`](Self::print_summary).
    pub fn record_stage(&self, name: &str, status: StageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.stages.lock() {
            guard.push(StageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Number of stages recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.stages.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|s| s.status == StageStatus::Failed)
                .count()
        })
    }

    /// Summary lines: one per stage, then the totals.
    fn summary_lines(stages: &[StageEntry]) -> Vec<String> {
        let mut lines = Vec::with_capacity(stages.len() + 1);
        for stage in stages {
            let (_, icon, color) = SUMMARY_ORDER
                .iter()
                .find(|(status, _, _)| *status == stage.status)
                .copied()
                .unwrap_or((stage.status, "?", ""));
            let suffix = stage
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            lines.push(format!(
                "{color}{icon} {:<14}\x1b[0m {}{suffix}",
                stage.status.label(),
                stage.name
            ));
        }

        let totals: Vec<String> = SUMMARY_ORDER
            .iter()
            .filter_map(|(status, _, color)| {
                let n = stages.iter().filter(|s| s.status == *status).count();
                (n > 0).then(|| format!("{color}{n} {}\x1b[0m", status.label()))
            })
            .collect();
        lines.push(format!("{} stages: {}", stages.len(), totals.join(", ")));
        lines
    }

    /// Log the outcome of every recorded stage.
    pub fn print_summary(&self) {
        let stages = self.stage_entries();
        if stages.is_empty() {
            return;
        }

        self.stage("Summary");
        for line in Self::summary_lines(&stages) {
            self.info(&line);
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        self.stage(msg);
    }

    fn info(&self, msg: &str) {
        self.info(msg);
    }

    fn debug(&self, msg: &str) {
        self.debug(msg);
    }

    fn warn(&self, msg: &str) {
        self.warn(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }

    fn dry_run(&self, msg: &str) {
        self.dry_run(msg);
    }

    fn record_stage(&self, name: &str, status: StageStatus, message: Option<&str>) {
        self.record_stage(name, status, message);
    }
}
