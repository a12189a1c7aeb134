//! Release-archive installs: download, verify, extract under
//! `~/.local/opt/<tool>` and link the binary into `~/.local/bin`.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::helpers::fs::{create_symlink, remove_existing};
use super::{Applicable, ResourceChange};
use crate::error::InstallError;
use crate::fetch::{Fetcher, compute_sha256, extract_tar_gz};
use crate::platform::Os;

/// Substitute `{os}` and `{arch}` in a release URL or archive path.
#[must_use]
pub fn expand_url(url: &str, os: Os, arch: &str) -> String {
    url.replace("{os}", &os.to_string())
        .replace("{arch}", arch)
}

/// A release tarball to install for one tool.
#[derive(Debug)]
pub struct ArchiveResource<'a> {
    tool: &'a str,
    url: String,
    bin: String,
    sha256: Option<&'a str>,
    home: &'a Path,
    fetcher: &'a dyn Fetcher,
}

impl<'a> ArchiveResource<'a> {
    /// Archive install of `tool`; `bin` is the executable's path inside
    /// the extracted tree.
    #[must_use]
    pub const fn new(
        tool: &'a str,
        url: String,
        bin: String,
        sha256: Option<&'a str>,
        home: &'a Path,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        Self {
            tool,
            url,
            bin,
            sha256,
            home,
            fetcher,
        }
    }

    /// Extraction root for this tool.
    #[must_use]
    pub fn install_dir(&self) -> PathBuf {
        self.home.join(".local/opt").join(self.tool)
    }

    /// Where the binary is linked.
    #[must_use]
    pub fn link_path(&self) -> PathBuf {
        let name = Path::new(&self.bin)
            .file_name()
            .map_or_else(|| PathBuf::from(self.tool), PathBuf::from);
        self.home.join(".local/bin").join(name)
    }

    fn step_error(&self, step: &str, reason: impl std::fmt::Display) -> InstallError {
        InstallError::Procedure {
            tool: self.tool.to_string(),
            step: step.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Download, verify and extract the archive, then link the binary.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Procedure`] naming the failing step.
    pub fn install(&self) -> Result<PathBuf, InstallError> {
        let bytes = self
            .fetcher
            .download(&self.url)
            .map_err(|e| self.step_error("download", format!("{e:#}")))?;

        if let Some(expected) = self.sha256 {
            let actual = compute_sha256(&bytes);
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(self.step_error(
                    "verify",
                    format!("sha256 mismatch: expected {expected}, got {actual}"),
                ));
            }
        }

        let dir = self.install_dir();
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| self.step_error("extract", e))?;
        }
        std::fs::create_dir_all(&dir).map_err(|e| self.step_error("extract", e))?;
        extract_tar_gz(&bytes, &dir).map_err(|e| self.step_error("extract", format!("{e:#}")))?;

        let bin = dir.join(&self.bin);
        if !bin.is_file() {
            return Err(self.step_error(
                "link",
                format!("{} not found in archive", self.bin),
            ));
        }

        let link = self.link_path();
        remove_existing(&link).map_err(|e| self.step_error("link", format!("{e:#}")))?;
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.step_error("link", e))?;
        }
        create_symlink(&bin, &link).map_err(|e| self.step_error("link", e))?;
        Ok(link)
    }
}

impl Applicable for ArchiveResource<'_> {
    fn description(&self) -> String {
        format!("{} from {}", self.tool, self.url)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.install()?;
        Ok(ResourceChange::Applied)
    }
}
