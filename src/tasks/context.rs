//! Shared state handed to every stage.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::config::Config;
use crate::exec::{Executor, SystemExecutor};
use crate::fetch::{Fetcher, NetFetcher};
use crate::logging::Log;
use crate::platform::Platform;
use crate::probe::{Probe, SystemProbe};
use crate::prompt::{DialoguerPrompt, Prompt};
use crate::resources::package::PackageAdapter;
use crate::resources::symlink::BackupDir;

/// Shared context for stage execution.
///
/// Built once per run after platform detection; every stage reads the same
/// platform value and host services from it.
pub struct Context {
    /// Tool catalog and placement entries.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Platform,
    /// Logger for output and stage recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// User's home directory path.
    pub home: PathBuf,
    /// `$SHELL` at startup.
    pub login_shell: String,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Capability prober.
    pub probe: Arc<dyn Probe>,
    /// Source of gate confirmations.
    pub prompt: Arc<dyn Prompt>,
    /// Downloads and clones.
    pub fetcher: Arc<dyn Fetcher>,
    /// Set once the native package indexes were refreshed this run.
    pub indexes_refreshed: Arc<AtomicBool>,
    /// Backup directory shared by every placement in this run.
    pub backup: Arc<BackupDir>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("login_shell", &self.login_shell)
            .field("executor", &self.executor)
            .field("probe", &self.probe)
            .field("prompt", &self.prompt)
            .field("fetcher", &self.fetcher)
            .field("indexes_refreshed", &self.indexes_refreshed)
            .field("backup", &self.backup.path())
            .finish()
    }
}

impl Context {
    /// Creates a context wired to the real host: system executor and probe,
    /// interactive prompts and network fetcher.
    #[must_use]
    pub fn new(
        config: Config,
        platform: Platform,
        log: Arc<dyn Log>,
        dry_run: bool,
        home: PathBuf,
    ) -> Self {
        let backup = BackupDir::new(&home, chrono::Local::now());
        Self {
            config: Arc::new(config),
            platform,
            log,
            dry_run,
            login_shell: std::env::var("SHELL").unwrap_or_default(),
            executor: Arc::new(SystemExecutor),
            probe: Arc::new(SystemProbe::new(&home)),
            prompt: Arc::new(DialoguerPrompt),
            fetcher: Arc::new(NetFetcher),
            indexes_refreshed: Arc::new(AtomicBool::new(false)),
            backup: Arc::new(backup),
            home,
        }
    }

    /// Replace the command executor.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the capability probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the confirmation source.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the downloader.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Override the login shell read from `$SHELL`.
    #[must_use]
    pub fn with_login_shell(mut self, shell: impl Into<String>) -> Self {
        self.login_shell = shell.into();
        self
    }

    /// Root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Package adapter for the detected manager.
    #[must_use]
    pub fn packages(&self) -> PackageAdapter<'_> {
        PackageAdapter::new(self.platform.package_manager, &*self.probe, &*self.executor)
    }

    /// Refresh the native package indexes the first time this is called in
    /// a run. A failed refresh is only warned about.
    pub fn refresh_indexes_once(&self) {
        if self.indexes_refreshed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.log.debug(&format!(
            "refreshing {} package indexes",
            self.platform.package_manager
        ));
        if let Err(e) = self.packages().update_indexes() {
            self.log.warn(&e.to_string());
        }
    }
}

/// The user's home directory from `$HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is not set.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))
}
