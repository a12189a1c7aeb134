//! Arch User Repository installs through a helper (`paru`, then `yay`).
//!
//! Used only as a fallback on the Arch family. When no helper is present the
//! `paru-bin` package is built from the AUR with `makepkg` first.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::probe::Probe;

/// Helpers tried in order.
pub const HELPERS: &[&str] = &["paru", "yay"];

const PARU_BIN_REPO: &str = "https://aur.archlinux.org/paru-bin.git";

/// Default number of parallel jobs for makepkg if nproc detection fails.
const DEFAULT_NPROC: &str = "4";

/// AUR installs via the first available helper.
pub struct AurAdapter<'a> {
    executor: &'a dyn Executor,
    probe: &'a dyn Probe,
    log: &'a dyn Log,
}

impl std::fmt::Debug for AurAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AurAdapter")
            .field("executor", &self.executor)
            .field("probe", &self.probe)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl<'a> AurAdapter<'a> {
    /// Adapter issuing commands through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn Executor, probe: &'a dyn Probe, log: &'a dyn Log) -> Self {
        Self {
            executor,
            probe,
            log,
        }
    }

    /// First helper found on the search path.
    #[must_use]
    pub fn helper(&self) -> Option<PathBuf> {
        HELPERS.iter().find_map(|h| self.probe.locate(h))
    }

    /// Install `names` from the AUR, bootstrapping `paru` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Procedure`] if the bootstrap fails and
    /// [`InstallError::Failed`] if the helper exits non-zero.
    pub fn install(&self, names: &[String]) -> Result<(), InstallError> {
        let helper = match self.helper() {
            Some(h) => h,
            None => {
                self.bootstrap_paru().map_err(|e| InstallError::Procedure {
                    tool: "paru".to_string(),
                    step: "bootstrap".to_string(),
                    reason: format!("{e:#}"),
                })?;
                self.probe.locate("paru").ok_or_else(|| InstallError::Procedure {
                    tool: "paru".to_string(),
                    step: "bootstrap".to_string(),
                    reason: "paru not found after makepkg".to_string(),
                })?
            }
        };

        let program = helper.display().to_string();
        let mut args = vec!["-S", "--needed", "--noconfirm"];
        args.extend(names.iter().map(String::as_str));
        self.executor
            .run_interactive(&program, &args)
            .map_err(|e| InstallError::Failed {
                manager: "aur".to_string(),
                packages: names.to_vec(),
                reason: format!("{e:#}"),
            })
    }

    /// Build and install `paru-bin` from the AUR.
    fn bootstrap_paru(&self) -> Result<()> {
        self.log.info("no AUR helper found, bootstrapping paru");
        self.check_prerequisites()?;
        let tmp = prepare_build_directory(self.log)?;
        self.clone_paru(&tmp)?;
        let result = self.build_paru(&tmp);
        // Best effort; a leftover build dir is removed on the next run.
        std::fs::remove_dir_all(&tmp).ok();
        result
    }

    fn check_prerequisites(&self) -> Result<()> {
        for dep in &["git", "makepkg", "sudo"] {
            if !self.probe.is_present(dep) {
                anyhow::bail!("missing prerequisite: {dep}");
            }
            self.log.debug(&format!("prerequisite ok: {dep}"));
        }
        Ok(())
    }

    fn clone_paru(&self, tmp: &Path) -> Result<()> {
        self.log.debug("cloning paru-bin from AUR");
        self.executor
            .run("git", &["clone", PARU_BIN_REPO, &tmp.to_string_lossy()])
            .context("cloning paru-bin from AUR")?;
        Ok(())
    }

    fn build_paru(&self, tmp: &Path) -> Result<()> {
        let nproc = self.executor.run("nproc", &[]).map_or_else(
            |_| DEFAULT_NPROC.to_string(),
            |r| {
                let n = r.stdout.trim();
                if n.is_empty() {
                    DEFAULT_NPROC.to_string()
                } else {
                    n.to_string()
                }
            },
        );

        let makeflags = format!("-j{nproc}");
        self.log.debug(&format!("building with MAKEFLAGS={makeflags}"));
        self.executor
            .run_interactive_in(
                tmp,
                "makepkg",
                &["-si", "--noconfirm"],
                &[("MAKEFLAGS", &makeflags)],
            )
            .context("building paru with makepkg")?;
        Ok(())
    }
}

/// A clean build directory for paru.
fn prepare_build_directory(log: &dyn Log) -> Result<PathBuf> {
    let tmp = std::env::temp_dir().join("paru-build");
    if tmp.exists() {
        log.debug("removing previous paru build directory");
        std::fs::remove_dir_all(&tmp).context("removing previous paru build directory")?;
    }
    Ok(tmp)
}
