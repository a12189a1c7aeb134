//! Build-from-source installs: clone into `~/.local/src/<tool>` and run the
//! build commands there.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, ResourceChange};
use crate::error::InstallError;
use crate::exec::Executor;
use crate::fetch::Fetcher;

/// A repository to clone and build for one tool.
#[derive(Debug)]
pub struct SourceBuild<'a> {
    tool: &'a str,
    repo: &'a str,
    branch: Option<&'a str>,
    build: &'a [String],
    home: &'a Path,
    fetcher: &'a dyn Fetcher,
    executor: &'a dyn Executor,
}

impl<'a> SourceBuild<'a> {
    /// Build of `tool` from `repo`, checked out under `home`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        tool: &'a str,
        repo: &'a str,
        branch: Option<&'a str>,
        build: &'a [String],
        home: &'a Path,
        fetcher: &'a dyn Fetcher,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            tool,
            repo,
            branch,
            build,
            home,
            fetcher,
            executor,
        }
    }

    /// Checkout location.
    #[must_use]
    pub fn checkout_dir(&self) -> PathBuf {
        self.home.join(".local/src").join(self.tool)
    }

    /// Clone a fresh checkout and run every build command in order.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Procedure`] on the first failing step.
    pub fn install(&self) -> Result<(), InstallError> {
        let dir = self.checkout_dir();
        let err = |step: &str, reason: String| InstallError::Procedure {
            tool: self.tool.to_string(),
            step: step.to_string(),
            reason,
        };

        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| err("clone", e.to_string()))?;
        }
        if let Some(parent) = dir.parent() {
            std::fs::create_dir_all(parent).map_err(|e| err("clone", e.to_string()))?;
        }
        self.fetcher
            .clone_repo(self.repo, self.branch.map(str::to_string), &dir)
            .map_err(|e| err("clone", format!("{e:#}")))?;

        for command in self.build {
            self.executor
                .run_interactive_in(&dir, "sh", &["-c", command], &[])
                .map_err(|e| err("build", format!("`{command}`: {e:#}")))?;
        }
        Ok(())
    }
}

impl Applicable for SourceBuild<'_> {
    fn description(&self) -> String {
        format!("{} from {}", self.tool, self.repo)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.install()?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;
    use crate::resources::test_helpers::FakeHost;
    use mockall::predicate::{always, eq};

    #[test]
    fn clones_then_builds_in_order() {
        let home = tempfile::tempdir().unwrap();
        let expected_dir = home.path().join(".local/src/tmux");
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_clone_repo()
            .with(
                eq("https://github.com/tmux/tmux.git"),
                eq(Some("3.4".to_string())),
                eq(expected_dir),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));
        let host = FakeHost::new();
        let build = vec!["sh autogen.sh".to_string(), "make install".to_string()];

        SourceBuild::new(
            "tmux",
            "https://github.com/tmux/tmux.git",
            Some("3.4"),
            &build,
            home.path(),
            &fetcher,
            &host,
        )
        .install()
        .unwrap();

        assert_eq!(
            host.calls(),
            vec!["sh -c sh autogen.sh", "sh -c make install"]
        );
    }

    #[test]
    fn clone_failure_skips_build() {
        let home = tempfile::tempdir().unwrap();
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_clone_repo()
            .with(always(), eq(None), always())
            .returning(|_, _, _| Err(anyhow::anyhow!("network unreachable")));
        let host = FakeHost::new();
        let build = vec!["make".to_string()];

        let err = SourceBuild::new("t", "https://x/t.git", None, &build, home.path(), &fetcher, &host)
            .install()
            .unwrap_err();
        assert!(err.to_string().starts_with("clone failed for 't'"));
        assert!(host.calls().is_empty());
    }

    #[test]
    fn build_failure_stops_remaining_commands() {
        let home = tempfile::tempdir().unwrap();
        let mut fetcher = MockFetcher::new();
        fetcher.expect_clone_repo().returning(|_, _, _| Ok(()));
        let host = FakeHost::new().failing("make");
        let build = vec!["make".to_string(), "make install".to_string()];

        let err = SourceBuild::new("t", "https://x/t.git", None, &build, home.path(), &fetcher, &host)
            .install()
            .unwrap_err();
        assert!(err.to_string().contains("`make`"));
        assert_eq!(host.calls().len(), 1);
    }
}
