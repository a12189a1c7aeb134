//! Homebrew bootstrap on macOS.
use anyhow::{Result, bail};

use super::{Context, Task, TaskResult};
use crate::exec::piped_script;

/// Homebrew's vendor install script.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Install Homebrew on macOS. Not gated: nothing else can be installed
/// without it.
#[derive(Debug)]
pub struct EnsureHomebrew;

impl Task for EnsureHomebrew {
    fn name(&self) -> &str {
        "Ensure Homebrew"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_macos()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(path) = ctx.probe.locate("brew") {
            ctx.log
                .debug(&format!("brew already present at {}", path.display()));
            return Ok(TaskResult::Ok);
        }

        if ctx.dry_run {
            ctx.log.dry_run("would install Homebrew");
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info("installing Homebrew");
        let line = piped_script(HOMEBREW_INSTALL_URL, "bash", &[]);
        ctx.executor.run_interactive("sh", &["-c", &line])?;

        match ctx.probe.locate("brew") {
            Some(path) => {
                ctx.log
                    .info(&format!("Homebrew installed at {}", path.display()));
                Ok(TaskResult::Ok)
            }
            None => bail!("brew not found after running the Homebrew installer"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::FakeHost;
    use crate::tasks::test_helpers::{TestContext, debian, macos};
    use std::sync::Arc;

    #[test]
    fn linux_is_not_applicable() {
        let host = Arc::new(FakeHost::new());
        let t = TestContext::new(debian(), &host);
        assert!(!EnsureHomebrew.should_run(&t.ctx));
    }

    #[test]
    fn present_brew_is_left_alone() {
        let host = Arc::new(FakeHost::new().with_present(&["brew"]));
        let t = TestContext::new(macos(), &host);
        assert_eq!(EnsureHomebrew.run(&t.ctx).unwrap(), TaskResult::Ok);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn missing_brew_runs_vendor_script() {
        let host = Arc::new(FakeHost::new().installs("Homebrew/install", "brew"));
        let t = TestContext::new(macos(), &host);
        assert_eq!(EnsureHomebrew.run(&t.ctx).unwrap(), TaskResult::Ok);
        assert_eq!(
            host.calls(),
            vec![format!("sh -c curl -fsSL '{HOMEBREW_INSTALL_URL}' | bash")]
        );
    }

    #[test]
    fn installer_without_brew_fails() {
        let host = Arc::new(FakeHost::new());
        let t = TestContext::new(macos(), &host);
        assert!(EnsureHomebrew.run(&t.ctx).is_err());
    }

    #[test]
    fn dry_run_does_not_install() {
        let host = Arc::new(FakeHost::new());
        let mut t = TestContext::new(macos(), &host);
        t.ctx.dry_run = true;
        assert_eq!(EnsureHomebrew.run(&t.ctx).unwrap(), TaskResult::DryRun);
        assert!(host.calls().is_empty());
    }
}
