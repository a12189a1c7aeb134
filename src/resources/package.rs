//! Native package manager adapter.
//!
//! Each [`PackageManager`] has exactly one invocation form for refreshing its
//! indexes and one for installing; they are selected once from the detected
//! platform.
use crate::error::InstallError;
use crate::exec::Executor;
use crate::platform::PackageManager;
use crate::probe::Probe;

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to spawn.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn with(mut self, names: &[String]) -> Self {
        self.args.extend(names.iter().cloned());
        self
    }

    fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

/// Uniform `update_indexes` / `install_packages` verbs over the detected
/// native package manager.
#[derive(Debug)]
pub struct PackageAdapter<'a> {
    manager: PackageManager,
    /// Resolved `brew` executable; the Apple-silicon prefix is often not on
    /// `PATH` right after Homebrew was installed.
    brew: String,
    executor: &'a dyn Executor,
}

impl<'a> PackageAdapter<'a> {
    /// Adapter for `manager`, resolving `brew` through `probe`.
    #[must_use]
    pub fn new(manager: PackageManager, probe: &dyn Probe, executor: &'a dyn Executor) -> Self {
        let brew = probe
            .locate("brew")
            .map_or_else(|| "brew".to_string(), |p| p.display().to_string());
        Self {
            manager,
            brew,
            executor,
        }
    }

    /// Command line that refreshes the package indexes.
    ///
    /// Pacman syncs and upgrades together; a bare `-Sy` followed by `-S`
    /// leaves a partially upgraded system.
    #[must_use]
    pub fn update_invocation(&self) -> Invocation {
        match self.manager {
            PackageManager::Apt => Invocation::new("sudo", &["apt-get", "update"]),
            PackageManager::Pacman => {
                Invocation::new("sudo", &["pacman", "-Syu", "--noconfirm"])
            }
            PackageManager::Brew => Invocation::new(&self.brew, &["update"]),
        }
    }

    /// Command line that installs `names`.
    #[must_use]
    pub fn install_invocation(&self, names: &[String], cask: bool) -> Invocation {
        let base = match self.manager {
            PackageManager::Apt => Invocation::new("sudo", &["apt-get", "install", "-y"]),
            PackageManager::Pacman => {
                Invocation::new("sudo", &["pacman", "-S", "--needed", "--noconfirm"])
            }
            PackageManager::Brew if cask => Invocation::new(&self.brew, &["install", "--cask"]),
            PackageManager::Brew => Invocation::new(&self.brew, &["install"]),
        };
        base.with(names)
    }

    /// Refresh the package indexes.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::IndexUpdate`] if the command exits non-zero.
    pub fn update_indexes(&self) -> Result<(), InstallError> {
        let inv = self.update_invocation();
        self.executor
            .run_interactive(&inv.program, &inv.arg_refs())
            .map_err(|e| InstallError::IndexUpdate {
                manager: self.manager.to_string(),
                reason: format!("{e:#}"),
            })
    }

    /// Install native packages.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Failed`] if the command exits non-zero.
    pub fn install_packages(&self, names: &[String]) -> Result<(), InstallError> {
        self.install(names, false)
    }

    /// Install Homebrew casks.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Unsupported`] on managers other than brew and
    /// [`InstallError::Failed`] if the command exits non-zero.
    pub fn install_casks(&self, names: &[String]) -> Result<(), InstallError> {
        if self.manager != PackageManager::Brew {
            return Err(InstallError::Unsupported {
                strategy: "cask".to_string(),
                manager: self.manager.to_string(),
            });
        }
        self.install(names, true)
    }

    fn install(&self, names: &[String], cask: bool) -> Result<(), InstallError> {
        let inv = self.install_invocation(names, cask);
        self.executor
            .run_interactive(&inv.program, &inv.arg_refs())
            .map_err(|e| InstallError::Failed {
                manager: self.manager.to_string(),
                packages: names.to_vec(),
                reason: format!("{e:#}"),
            })
    }
}
