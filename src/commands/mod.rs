//! Shared setup for the top-level commands.
pub mod install;
pub mod status;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::validation::validate_all;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::probe::SystemProbe;
use crate::prompt::AssumeYes;
use crate::tasks::{Context, home_dir};

/// Exit status after Ctrl-C.
pub const EXIT_SIGINT: i32 = 130;

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "DEVSETUP_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution, platform detection and configuration loading
/// so that each command does not have to repeat the boilerplate. Every error
/// here is a precondition failure and aborts before any host mutation.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected host platform.
    pub platform: Platform,
    /// Loaded configuration.
    pub config: Config,
    /// The operator's home directory.
    pub home: PathBuf,
}

impl CommandSetup {
    /// Resolve the root, detect the platform and load all configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or `$HOME` cannot be determined, the
    /// platform is unsupported, or a configuration file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let root = resolve_root(global)?;
        let home = home_dir()?;

        log.stage("Detecting platform");
        let platform = Platform::detect(&SystemProbe::new(&home))?;
        log.info(&format!("platform: {platform}"));

        log.stage("Loading configuration");
        let config = Config::load(&root)
            .with_context(|| format!("loading configuration from {}", root.display()))?;
        log.debug(&format!("root: {}", root.display()));
        log.info(&format!(
            "loaded {} tools in {} categories, {} links",
            config.tools.len(),
            config.categories.len(),
            config.links.len()
        ));

        let warnings = validate_all(&config, &platform);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            platform,
            config,
            home,
        })
    }

    /// Build the run context, honouring `--yes` and `--dry-run`.
    #[must_use]
    pub fn into_context(self, global: &GlobalOpts, log: Arc<dyn Log>) -> Context {
        let ctx = Context::new(self.config, self.platform, log, global.dry_run, self.home);
        if global.yes {
            ctx.with_prompt(Arc::new(AssumeYes))
        } else {
            ctx
        }
    }
}

/// Exit with [`EXIT_SIGINT`] on Ctrl-C, warning that the step in progress
/// may be half-applied. Nothing is rolled back.
pub fn install_interrupt_handler(log: &dyn Log) {
    if let Err(e) = ctrlc::set_handler(|| {
        tracing::warn!("interrupted; the step in progress may be half-applied");
        std::process::exit(EXIT_SIGINT);
    }) {
        log.warn(&format!("cannot install Ctrl-C handler: {e}"));
    }
}

/// Resolve the repository root from CLI arguments or auto-detection.
///
/// Order: `--root`, then `DEVSETUP_ROOT`, then the binary's location, then
/// the current directory when it contains `conf/`.
///
/// # Errors
///
/// Returns an error if no candidate exists.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let env_root = std::env::var_os(ROOT_ENV).map(PathBuf::from);
    let exe = std::env::current_exe().ok();
    let cwd = std::env::current_dir().context("reading current directory")?;
    resolve_root_from(global.root.as_deref(), env_root.as_deref(), exe.as_deref(), &cwd)
}

/// [`resolve_root`] over explicit inputs.
///
/// # Errors
///
/// Returns an error if an explicit root does not exist or no candidate
/// contains `conf/`.
pub fn resolve_root_from(
    explicit: Option<&Path>,
    env_root: Option<&Path>,
    exe: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf> {
    if let Some(root) = explicit.or(env_root) {
        return dunce::canonicalize(root)
            .with_context(|| format!("repository root {} does not exist", root.display()));
    }

    if let Some(parent) = exe.and_then(Path::parent) {
        // target/release/ or bin/ inside the repository
        let candidates = [parent.join("../.."), parent.join("..")];
        for candidate in &candidates {
            if candidate.join("conf").is_dir() {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    if cwd.join("conf").is_dir() {
        return Ok(cwd.to_path_buf());
    }

    anyhow::bail!("cannot determine repository root. Use --root or set {ROOT_ENV}");
}
