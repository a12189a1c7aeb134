//! Network access behind an injectable [`Fetcher`]: release downloads and
//! repository clones.
use anyhow::{Context as _, Result};
use std::path::Path;

/// Largest release archive accepted.
const MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// Downloads and clones used by the `archive` and `source` strategies.
#[cfg_attr(test, mockall::automock)]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Fetch `url` into memory.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure or a non-success HTTP status.
    fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Clone `url` into `dest`, optionally checking out `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails.
    fn clone_repo(&self, url: &str, branch: Option<String>, dest: &Path) -> Result<()>;
}

/// Production [`Fetcher`]: `ureq` for HTTP and `git2` for clones.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetFetcher;

impl Fetcher for NetFetcher {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = ureq::get(url)
            .call()
            .with_context(|| format!("GET {url}"))?;
        response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_BYTES)
            .read_to_vec()
            .with_context(|| format!("reading body of {url}"))
    }

    fn clone_repo(&self, url: &str, branch: Option<String>, dest: &Path) -> Result<()> {
        let mut builder = git2::build::RepoBuilder::new();
        if let Some(branch) = branch.as_deref() {
            builder.branch(branch);
        }
        builder
            .clone(url, dest)
            .with_context(|| format!("cloning {url} into {}", dest.display()))?;
        Ok(())
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn compute_sha256(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let result = Sha256::digest(bytes);
    let mut hex = String::with_capacity(64);
    for b in &result {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}

/// Unpack a gzip-compressed tarball into `dest`.
///
/// # Errors
///
/// Returns an error if the data is not a valid `.tar.gz` or a file cannot be
/// written.
pub fn extract_tar_gz(bytes: &[u8], dest: &Path) -> Result<()> {
    let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(dest)
        .with_context(|| format!("extracting archive into {}", dest.display()))
}
