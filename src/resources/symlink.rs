//! Configuration file placement: symlink source -> dest with backup.
use anyhow::Result;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use super::helpers::fs::{create_symlink, move_path};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::PlacementError;

/// Directory under `$HOME` that collects displaced files.
pub const BACKUP_DIR_NAME: &str = ".devsetup-backup";

const MAX_SUFFIX: u32 = 1000;

/// Per-run backup location: `~/.devsetup-backup/<run-start timestamp>`.
///
/// The directory is only created when the first file is moved into it. A
/// run that starts in the same second as an earlier one gets a `-N` suffix
/// instead of sharing its directory.
#[derive(Debug)]
pub struct BackupDir {
    home: PathBuf,
    stamp: String,
    created: OnceLock<PathBuf>,
}

impl BackupDir {
    /// Backup location for a run that started at `started`.
    #[must_use]
    pub fn new(home: &Path, started: chrono::DateTime<chrono::Local>) -> Self {
        Self {
            home: home.to_path_buf(),
            stamp: started.format("%Y%m%d-%H%M%S").to_string(),
            created: OnceLock::new(),
        }
    }

    /// The directory this run backs up into.
    ///
    /// Before anything has been stashed this is the preferred name; the
    /// directory actually created may carry a suffix.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.created.get().cloned().unwrap_or_else(|| {
            self.home.join(BACKUP_DIR_NAME).join(&self.stamp)
        })
    }

    /// Whether anything has been backed up during this run.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.created.get().is_some()
    }

    fn ensure_created(&self) -> io::Result<&Path> {
        if let Some(path) = self.created.get() {
            return Ok(path.as_path());
        }
        let parent = self.home.join(BACKUP_DIR_NAME);
        std::fs::create_dir_all(&parent)?;
        for n in 0..MAX_SUFFIX {
            let name = if n == 0 {
                self.stamp.clone()
            } else {
                format!("{}-{n}", self.stamp)
            };
            let candidate = parent.join(name);
            match std::fs::create_dir(&candidate) {
                Ok(()) => return Ok(self.created.get_or_init(|| candidate).as_path()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free backup directory for {} under {}", self.stamp, parent.display()),
        ))
    }

    /// Move `dest` into the backup directory, preserving its path relative
    /// to `$HOME`. Returns the new location.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::Backup`] if the directory cannot be created,
    /// `dest` would land outside it, something is already stored at the
    /// target, or the move fails.
    pub fn stash(&self, dest: &Path) -> Result<PathBuf, PlacementError> {
        let backup_err = |source| PlacementError::Backup {
            path: dest.display().to_string(),
            source,
        };

        let rel = dest
            .strip_prefix(&self.home)
            .map_or_else(|_| PathBuf::from(dest.file_name().unwrap_or_default()), Path::to_path_buf);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(backup_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path escapes the home directory",
            )));
        }

        let dir = self.ensure_created().map_err(backup_err)?;
        let target = dir.join(rel);
        move_path(dest, &target).map_err(backup_err)?;
        Ok(target)
    }
}

/// Result of placing a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link was created; `backup` is where a displaced file went.
    Linked {
        /// Backup location of a pre-existing regular file or directory.
        backup: Option<PathBuf>,
    },
    /// The destination already pointed at the source.
    AlreadyLinked,
    /// Nothing was done.
    Skipped {
        /// Why the link was skipped.
        reason: String,
    },
}

/// A symlink resource that can be checked and applied.
#[derive(Debug)]
pub struct SymlinkResource<'a> {
    /// The file the link points to (inside the repository).
    pub source: PathBuf,
    /// Where the link is created (inside `$HOME`).
    pub dest: PathBuf,
    backup: &'a BackupDir,
}

impl<'a> SymlinkResource<'a> {
    /// Link `dest` to `source`, displacing into `backup`.
    #[must_use]
    pub const fn new(source: PathBuf, dest: PathBuf, backup: &'a BackupDir) -> Self {
        Self {
            source,
            dest,
            backup,
        }
    }

    fn inspect(&self) -> ResourceState {
        if self.source.symlink_metadata().is_err() {
            return ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            };
        }

        match std::fs::read_link(&self.dest) {
            Ok(existing) if existing == self.source => ResourceState::Correct,
            Ok(existing) => ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            },
            Err(_) if self.dest.symlink_metadata().is_ok() => ResourceState::Incorrect {
                current: "existing file".to_string(),
            },
            Err(_) => ResourceState::Missing,
        }
    }

    /// Place the link.
    ///
    /// A pre-existing non-symlink destination is moved into the run's backup
    /// directory first; a stale symlink is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError`] if the backup, removal or link creation
    /// fails.
    pub fn link(&self) -> Result<LinkOutcome, PlacementError> {
        match self.inspect() {
            ResourceState::Invalid { reason } => return Ok(LinkOutcome::Skipped { reason }),
            ResourceState::Correct => return Ok(LinkOutcome::AlreadyLinked),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }

        let link_err = |source| PlacementError::Link {
            dest: self.dest.display().to_string(),
            source_path: self.source.display().to_string(),
            source,
        };

        let backup = match self.dest.symlink_metadata() {
            Ok(meta) if meta.file_type().is_symlink() => {
                std::fs::remove_file(&self.dest).map_err(link_err)?;
                None
            }
            Ok(_) => Some(self.backup.stash(&self.dest)?),
            Err(_) => None,
        };

        if let Some(parent) = self.dest.parent() {
            std::fs::create_dir_all(parent).map_err(link_err)?;
        }
        create_symlink(&self.source, &self.dest).map_err(link_err)?;

        Ok(LinkOutcome::Linked { backup })
    }
}

impl Applicable for SymlinkResource<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.dest.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        Ok(match self.link()? {
            LinkOutcome::Linked { .. } => ResourceChange::Applied,
            LinkOutcome::AlreadyLinked => ResourceChange::AlreadyCorrect,
            LinkOutcome::Skipped { reason } => ResourceChange::Skipped { reason },
        })
    }
}

impl Resource for SymlinkResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(self.inspect())
    }
}
