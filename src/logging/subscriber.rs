//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_datetime, format_time, log_file_path, strip_ansi};
use super::{DRY_RUN_TARGET, STAGE_TARGET};

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends every event to the run's log
/// file, timestamped and with ANSI codes stripped.
///
/// Captures `DEBUG` and above regardless of console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path` and write a run header naming `command`.
    ///
    /// Returns `None` if the file cannot be written.
    pub(super) fn create(path: &Path, command: &str) -> Option<Self> {
        let version = crate::commands::version::version();
        let rule = "-".repeat(60);
        let header = format!(
            "{rule}\ndevsetup {version} {command} started {}\n{rule}\n",
            format_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }

    fn line(level: tracing::Level, target: &str, msg: &str) -> String {
        let tag = match (level, target) {
            (tracing::Level::INFO, STAGE_TARGET) => return format!("==> {msg}"),
            (tracing::Level::INFO, DRY_RUN_TARGET) => "dry-run",
            (tracing::Level::ERROR, _) => "error",
            (tracing::Level::WARN, _) => "warn",
            (tracing::Level::INFO, _) => "info",
            _ => "debug",
        };
        format!("{tag:>7}  {msg}")
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let line = Self::line(
            *metadata.level(),
            metadata.target(),
            &strip_ansi(&extractor.message),
        );

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {line}", format_time()).ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits the
/// `==>` stage style on the console.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        let prefix = match (*metadata.level(), metadata.target()) {
            (tracing::Level::ERROR, _) => "\x1b[31mERROR\x1b[0m ",
            (tracing::Level::WARN, _) => "\x1b[33mWARN\x1b[0m  ",
            (tracing::Level::INFO, STAGE_TARGET) => {
                return writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
            }
            (tracing::Level::INFO, DRY_RUN_TARGET) => "  \x1b[33m[DRY RUN]\x1b[0m ",
            (tracing::Level::INFO, _) => "  ",
            _ => return writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        };
        writeln!(writer, "{prefix}{msg}")
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console events go through [`ConsoleFormatter`] (warnings and errors on
/// stderr, the rest on stdout); every event at `DEBUG` and above is appended
/// to `$XDG_CACHE_HOME/devsetup/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = log_file_path(command)
        .and_then(|path| FileLayer::create(&path, command))
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn file_lines_are_tagged_by_level() {
        assert_eq!(FileLayer::line(Level::INFO, STAGE_TARGET, "Install"), "==> Install");
        assert_eq!(FileLayer::line(Level::INFO, DRY_RUN_TARGET, "x"), "dry-run  x");
        assert_eq!(FileLayer::line(Level::WARN, "devsetup", "x"), "   warn  x");
        assert_eq!(FileLayer::line(Level::DEBUG, "devsetup", "x"), "  debug  x");
    }

    #[test]
    fn create_truncates_and_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("install.log");
        fs::write(&path, "stale\n").unwrap();

        FileLayer::create(&path, "install").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("devsetup "));
        assert!(content.contains(" install started "));
    }
}
