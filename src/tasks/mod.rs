//! Ordered, gated stages that orchestrate provisioning and placement.
mod context;
pub mod homebrew;
pub mod links;
pub mod shell;
pub mod tools;

pub use context::{Context, home_dir};

use anyhow::Result;

use crate::config::Config;
use crate::logging::StageStatus;

/// Result of running a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Stage completed successfully.
    Ok,
    /// Stage had nothing to do.
    Skipped(String),
    /// Stage ran in dry-run mode.
    DryRun,
}

/// A named stage of the install workflow.
pub trait Task: Send + Sync {
    /// Human-readable stage name.
    fn name(&self) -> &str;

    /// Question asked before the stage runs; `None` runs it unconditionally.
    fn gate(&self, _ctx: &Context) -> Option<String> {
        None
    }

    /// Whether this stage applies to the current platform and configuration.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the stage.
    ///
    /// # Errors
    ///
    /// Returns an error if any step in the stage failed. Remaining steps of
    /// the stage still run; the error summarises the failures.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Task").field(&self.name()).finish()
    }
}

/// The stages run by the install command, in order.
#[must_use]
pub fn install_tasks(config: &Config) -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = vec![Box::new(homebrew::EnsureHomebrew)];
    tasks.extend(
        config
            .categories
            .iter()
            .map(|c| Box::new(tools::ProvisionCategory::new(c.clone())) as Box<dyn Task>),
    );
    tasks.push(Box::new(links::PlaceConfigFiles));
    tasks.push(Box::new(shell::ChangeLoginShell));
    tasks
}

/// Execute a stage, recording the result in the logger.
///
/// A declined gate records the stage as skipped; stage failures are recorded
/// and never stop later stages.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping stage: {} (not applicable)", task.name()));
        ctx.log
            .record_stage(task.name(), StageStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    if let Some(question) = task.gate(ctx) {
        match ctx.prompt.confirm(&question) {
            Ok(true) => {}
            Ok(false) => {
                ctx.log.info("skipped: declined");
                ctx.log
                    .record_stage(task.name(), StageStatus::Skipped, Some("declined"));
                return;
            }
            Err(e) => {
                ctx.log.error(&format!("{}: {e:#}", task.name()));
                ctx.log
                    .record_stage(task.name(), StageStatus::Failed, Some(&format!("{e:#}")));
                return;
            }
        }
    }

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_stage(task.name(), StageStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_stage(task.name(), StageStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_stage(task.name(), StageStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_stage(task.name(), StageStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
