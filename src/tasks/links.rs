//! Configuration file placement stage.
use anyhow::{Result, bail};

use super::{Context, Task, TaskResult};
use crate::resources::symlink::{LinkOutcome, SymlinkResource};
use crate::resources::{Resource, ResourceState};

/// Symlink configuration files from the repository into `$HOME`.
#[derive(Debug)]
pub struct PlaceConfigFiles;

impl Task for PlaceConfigFiles {
    fn name(&self) -> &str {
        "Link configuration files"
    }

    fn gate(&self, _ctx: &Context) -> Option<String> {
        Some("Link configuration files into your home directory?".to_string())
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.links.iter().any(|l| l.applies_to(&ctx.platform))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut linked = 0u32;
        let mut already_ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = Vec::new();

        for link in ctx.config.links.iter().filter(|l| l.applies_to(&ctx.platform)) {
            if link.dest_escapes_home() {
                ctx.log
                    .warn(&format!("skipping {}: {} is outside $HOME", link.source, link.dest));
                skipped += 1;
                continue;
            }

            let resource = SymlinkResource::new(
                link.source_path(ctx.root()),
                link.dest_path(&ctx.home),
                &ctx.backup,
            );

            if ctx.dry_run {
                match resource.current_state()? {
                    ResourceState::Correct => already_ok += 1,
                    ResourceState::Invalid { reason } => {
                        ctx.log.warn(&format!("skipping {}: {reason}", link.source));
                        skipped += 1;
                    }
                    ResourceState::Incorrect { current } => {
                        ctx.log.dry_run(&format!(
                            "would replace {} ({current}) -> {}",
                            resource.dest.display(),
                            resource.source.display()
                        ));
                        linked += 1;
                    }
                    ResourceState::Missing => {
                        ctx.log.dry_run(&format!(
                            "would link {} -> {}",
                            resource.dest.display(),
                            resource.source.display()
                        ));
                        linked += 1;
                    }
                }
                continue;
            }

            match resource.link() {
                Ok(LinkOutcome::Linked { backup }) => {
                    if let Some(backup) = backup {
                        ctx.log.info(&format!(
                            "backed up {} to {}",
                            resource.dest.display(),
                            backup.display()
                        ));
                    }
                    ctx.log.debug(&format!(
                        "linked {} -> {}",
                        resource.dest.display(),
                        resource.source.display()
                    ));
                    linked += 1;
                }
                Ok(LinkOutcome::AlreadyLinked) => already_ok += 1,
                Ok(LinkOutcome::Skipped { reason }) => {
                    ctx.log.warn(&format!("skipping {}: {reason}", link.source));
                    skipped += 1;
                }
                Err(e) => {
                    ctx.log.error(&e.to_string());
                    failed.push(link.source.clone());
                }
            }
        }

        ctx.log.info(&format!(
            "{linked} linked, {already_ok} already linked, {skipped} skipped"
        ));
        if ctx.backup.is_created() {
            ctx.log.info(&format!(
                "previous files saved under {}",
                ctx.backup.path().display()
            ));
        }

        if !failed.is_empty() {
            bail!("failed to link: {}", failed.join(", "));
        }
        if ctx.dry_run {
            return Ok(TaskResult::DryRun);
        }
        Ok(TaskResult::Ok)
    }
}
