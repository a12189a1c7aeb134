//! Login shell stage.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::resources::shell::DefaultShellResource;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

const TARGET_SHELL: &str = "zsh";

/// Change the login shell to zsh.
#[derive(Debug)]
pub struct ChangeLoginShell;

impl ChangeLoginShell {
    fn resource(ctx: &Context) -> DefaultShellResource<'_> {
        DefaultShellResource::new(
            TARGET_SHELL.to_string(),
            ctx.login_shell.clone(),
            &*ctx.probe,
            &*ctx.executor,
        )
    }

    /// Why there is nothing to do, if so.
    fn nothing_to_do(ctx: &Context) -> Option<String> {
        let resource = Self::resource(ctx);
        if matches!(resource.current_state(), Ok(ResourceState::Correct)) {
            return Some(format!("login shell is already {TARGET_SHELL}"));
        }
        if !ctx.probe.is_present(TARGET_SHELL) {
            return Some(format!("{TARGET_SHELL} is not installed"));
        }
        None
    }
}

impl Task for ChangeLoginShell {
    fn name(&self) -> &str {
        "Change login shell"
    }

    fn gate(&self, ctx: &Context) -> Option<String> {
        // Nothing to confirm when run() will only report a skip.
        Self::nothing_to_do(ctx).is_none().then(|| {
            format!(
                "Change login shell from {} to {TARGET_SHELL}?",
                if ctx.login_shell.is_empty() {
                    "(unset)"
                } else {
                    &ctx.login_shell
                }
            )
        })
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(reason) = Self::nothing_to_do(ctx) {
            return Ok(TaskResult::Skipped(reason));
        }

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would run chsh -s <path to {TARGET_SHELL}>"));
            return Ok(TaskResult::DryRun);
        }

        match Self::resource(ctx).apply()? {
            ResourceChange::Skipped { reason } => Ok(TaskResult::Skipped(reason)),
            ResourceChange::Applied | ResourceChange::AlreadyCorrect => {
                ctx.log.info(&format!(
                    "login shell changed to {TARGET_SHELL}; takes effect at next login"
                ));
                Ok(TaskResult::Ok)
            }
        }
    }
}
