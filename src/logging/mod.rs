//! Console and file logging on top of [`tracing`].

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, StageEntry, StageStatus};

/// Tracing target for stage headers.
pub(crate) const STAGE_TARGET: &str = "devsetup::stage";
/// Tracing target for dry-run notices.
pub(crate) const DRY_RUN_TARGET: &str = "devsetup::dry_run";

/// A [`Logger`] whose events reach a fresh log file through a thread-local
/// subscriber. Keep the guard alive for the duration of the test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer =
        subscriber::FileLayer::create(&path, "test").expect("failed to create file layer");
    let log = Logger::with_log_path(Some(path));
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
