//! Stage outcome records and the [`Log`] trait.

/// Outcome of one stage, kept for the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEntry {
    /// Stage name as shown in its header.
    pub name: String,
    /// How the stage ended.
    pub status: StageStatus,
    /// Skip reason or failure detail.
    pub message: Option<String>,
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Every step in the stage succeeded.
    Ok,
    /// The stage has nothing for this platform.
    NotApplicable,
    /// Declined at its gate, or nothing to do.
    Skipped,
    /// Dry run; changes were only reported.
    DryRun,
    /// At least one step failed.
    Failed,
}

impl StageStatus {
    /// Lowercase label used in the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "not-applicable",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

/// Sink for engine output, injectable so stages can be tested against a
/// plain [`Logger`](super::Logger) without a global subscriber.
pub trait Log: Send + Sync {
    /// Major section header.
    fn stage(&self, msg: &str);
    /// Progress or result line.
    fn info(&self, msg: &str);
    /// Detail shown on the console only with `-v`; always in the log file.
    fn debug(&self, msg: &str);
    /// Recoverable problem.
    fn warn(&self, msg: &str);
    /// Failed step.
    fn error(&self, msg: &str);
    /// What a dry run would have done.
    fn dry_run(&self, msg: &str);
    /// Remember a stage outcome for the summary.
    fn record_stage(&self, name: &str, status: StageStatus, message: Option<&str>);
}
