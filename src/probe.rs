//! Capability probing: is a named tool reachable on the execution path?
//!
//! The running process's `PATH` is captured before anything is installed, so
//! a tool dropped into `~/.cargo/bin` or `/opt/homebrew/bin` by a vendor
//! installer would be invisible to a plain lookup. [`SystemProbe`] therefore
//! searches `PATH` followed by a fixed list of well-known install
//! directories.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Read-only query for the presence of executables and files.
///
/// Implementations must be side-effect free: the engine probes before and
/// after every install and again for the final summary.
pub trait Probe: Send + Sync + std::fmt::Debug {
    /// Resolve `command` to the executable that would run.
    fn locate(&self, command: &str) -> Option<PathBuf>;

    /// Whether `command` is present.
    fn is_present(&self, command: &str) -> bool {
        self.locate(command).is_some()
    }

    /// Whether a plain file exists (used for payload such as fonts).
    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Directories (relative to `$HOME` unless absolute) searched after `PATH`.
const EXTRA_DIRS: &[&str] = &[
    ".local/bin",
    ".cargo/bin",
    "/opt/homebrew/bin",
    "/usr/local/bin",
];

/// Production [`Probe`] backed by the [`which`] crate.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    search_path: OsString,
    cwd: PathBuf,
}

impl SystemProbe {
    /// Build a probe over the current `PATH` plus the well-known install
    /// directories under `home`.
    #[must_use]
    pub fn new(home: &Path) -> Self {
        let path = std::env::var_os("PATH").unwrap_or_default();
        Self::with_path(home, &path)
    }

    /// Build a probe over an explicit `PATH` value.
    #[must_use]
    pub fn with_path(home: &Path, path: &OsString) -> Self {
        let mut dirs: Vec<PathBuf> = std::env::split_paths(path).collect();
        for extra in EXTRA_DIRS {
            let dir = if extra.starts_with('/') {
                PathBuf::from(extra)
            } else {
                home.join(extra)
            };
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        let search_path = std::env::join_paths(&dirs).unwrap_or_else(|_| path.clone());
        Self {
            search_path,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
        }
    }
}

impl Probe for SystemProbe {
    fn locate(&self, command: &str) -> Option<PathBuf> {
        which::which_in(command, Some(&self.search_path), &self.cwd).ok()
    }
}
