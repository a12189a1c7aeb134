//! Per-category install stages.
use anyhow::{Result, bail};

use super::{Context, Task, TaskResult};
use crate::config::tools::Category;
use crate::provision::{self, StepStatus};

/// Ensure every tool of one category is present.
#[derive(Debug)]
pub struct ProvisionCategory {
    category: Category,
    name: String,
}

impl ProvisionCategory {
    /// Stage for every tool in `category`.
    #[must_use]
    pub fn new(category: Category) -> Self {
        let name = format!("Install {} tools", category.title);
        Self { category, name }
    }
}

impl Task for ProvisionCategory {
    fn name(&self) -> &str {
        &self.name
    }

    fn gate(&self, _ctx: &Context) -> Option<String> {
        Some(format!("Install {} tools?", self.category.title))
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config
            .tools_in(&self.category.id)
            .any(|t| t.applies_to(&ctx.platform))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut installed = 0u32;
        let mut present = 0u32;
        let mut planned = 0u32;
        let mut failed = Vec::new();

        for tool in ctx.config.tools_in(&self.category.id) {
            let outcome = provision::ensure(tool, ctx);
            match outcome.status {
                StepStatus::Installed => installed += 1,
                StepStatus::AlreadyPresent => present += 1,
                StepStatus::Planned => planned += 1,
                StepStatus::Failed => failed.push(outcome.tool),
                StepStatus::Skipped => {}
            }
        }

        ctx.log.info(&format!(
            "{installed} installed, {present} already present, {} failed",
            failed.len()
        ));

        if !failed.is_empty() {
            bail!("failed to install: {}", failed.join(", "));
        }
        if ctx.dry_run && planned > 0 {
            return Ok(TaskResult::DryRun);
        }
        Ok(TaskResult::Ok)
    }
}
