//! The provisioning step: ensure one tool is present.
//!
//! Probe first; only when the tool is missing walk its strategies for the
//! active package manager in order, re-probing after each one that completes,
//! until the tool shows up or the list is exhausted.
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::tools::{Check, Strategy, Tool};
use crate::error::InstallError;
use crate::exec::piped_script;
use crate::resources::Applicable;
use crate::resources::archive::{ArchiveResource, expand_url};
use crate::resources::aur::AurAdapter;
use crate::resources::source::SourceBuild;
use crate::tasks::Context;

/// Outcome of a single provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// The probe found the tool; nothing was run.
    AlreadyPresent,
    /// A strategy ran and the tool is now present.
    Installed,
    /// No strategy made the tool present.
    Failed,
    /// The tool does not apply to this platform.
    Skipped,
    /// Dry run: the tool is missing and would be installed.
    Planned,
}

impl StepStatus {
    /// Lowercase label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AlreadyPresent => "already-present",
            Self::Installed => "installed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Planned => "planned",
        }
    }
}

/// Result of [`ensure`] for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Tool name.
    pub tool: String,
    /// What happened.
    pub status: StepStatus,
    /// Resolved location when present, or the failure reason.
    pub detail: Option<String>,
}

impl StepOutcome {
    fn new(tool: &Tool, status: StepStatus, detail: Option<String>) -> Self {
        Self {
            tool: tool.name.clone(),
            status,
            detail,
        }
    }
}

/// Where the tool's probe resolves, if it is present.
#[must_use]
pub fn locate(tool: &Tool, ctx: &Context) -> Option<PathBuf> {
    match &tool.check {
        Check::Command(cmd) => ctx.probe.locate(cmd),
        Check::File(rel) => {
            let path = ctx.home.join(rel.strip_prefix("~/").unwrap_or(rel.as_str()));
            ctx.probe.file_exists(&path).then_some(path)
        }
    }
}

/// Ensure `tool` is present.
///
/// Never returns an error: every failure is logged and reported as
/// [`StepStatus::Failed`] so the run can continue with the next tool.
#[must_use]
pub fn ensure(tool: &Tool, ctx: &Context) -> StepOutcome {
    if !tool.applies_to(&ctx.platform) {
        ctx.log
            .debug(&format!("{}: not applicable to {}", tool.name, ctx.platform));
        return StepOutcome::new(tool, StepStatus::Skipped, None);
    }

    if let Some(path) = locate(tool, ctx) {
        ctx.log
            .debug(&format!("{}: already present at {}", tool.name, path.display()));
        return StepOutcome::new(
            tool,
            StepStatus::AlreadyPresent,
            Some(path.display().to_string()),
        );
    }

    let manager = ctx.platform.package_manager;
    let strategies = tool.strategies_for(manager);
    if strategies.is_empty() {
        let reason = format!("no install strategy for {manager}");
        ctx.log.error(&format!("{}: {reason}", tool.name));
        return StepOutcome::new(tool, StepStatus::Failed, Some(reason));
    }

    if ctx.dry_run {
        let kinds: Vec<&str> = strategies.iter().map(Strategy::kind).collect();
        ctx.log.dry_run(&format!(
            "would install {} via {}",
            tool.name,
            kinds.join(", then ")
        ));
        return StepOutcome::new(tool, StepStatus::Planned, None);
    }

    let mut last_error = None;
    for strategy in strategies {
        ctx.log
            .info(&format!("installing {} ({})", tool.name, strategy.kind()));
        match run_strategy(tool, strategy, ctx) {
            Ok(()) => {
                if locate(tool, ctx).is_some() {
                    break;
                }
                ctx.log.debug(&format!(
                    "{}: still not found after {} strategy",
                    tool.name,
                    strategy.kind()
                ));
            }
            Err(e) => {
                ctx.log.warn(&format!("{}: {e:#}", tool.name));
                last_error = Some(format!("{e:#}"));
            }
        }
    }

    if let Some(path) = locate(tool, ctx) {
        ctx.log
            .info(&format!("{} installed at {}", tool.name, path.display()));
        run_post_install(tool, ctx);
        return StepOutcome::new(
            tool,
            StepStatus::Installed,
            Some(path.display().to_string()),
        );
    }

    let reason = last_error.unwrap_or_else(|| "not found after every install strategy".to_string());
    ctx.log.error(&format!("{} was not installed: {reason}", tool.name));
    StepOutcome::new(tool, StepStatus::Failed, Some(reason))
}

fn run_strategy(tool: &Tool, strategy: &Strategy, ctx: &Context) -> Result<()> {
    match strategy {
        Strategy::Package(name) => {
            ctx.refresh_indexes_once();
            ctx.packages().install_packages(std::slice::from_ref(name))?;
        }
        Strategy::Cask(name) => {
            ctx.refresh_indexes_once();
            ctx.packages().install_casks(std::slice::from_ref(name))?;
        }
        Strategy::Aur(name) => {
            if !ctx.platform.is_arch() {
                return Err(InstallError::Unsupported {
                    strategy: "aur".to_string(),
                    manager: ctx.platform.package_manager.to_string(),
                }
                .into());
            }
            AurAdapter::new(&*ctx.executor, &*ctx.probe, &*ctx.log)
                .install(std::slice::from_ref(name))?;
        }
        Strategy::Script { url, args, shell } => {
            let line = piped_script(url, shell, args);
            ctx.log.debug(&format!("running: {line}"));
            ctx.executor
                .run_interactive("sh", &["-c", &line])
                .map_err(|e| InstallError::Procedure {
                    tool: tool.name.clone(),
                    step: "script".to_string(),
                    reason: format!("{e:#}"),
                })?;
        }
        Strategy::Archive { url, bin, sha256 } => {
            let (os, arch) = (ctx.platform.os, std::env::consts::ARCH);
            apply_resource(
                &ArchiveResource::new(
                    &tool.name,
                    expand_url(url, os, arch),
                    expand_url(bin, os, arch),
                    sha256.as_deref(),
                    &ctx.home,
                    &*ctx.fetcher,
                ),
                ctx,
            )?;
        }
        Strategy::Source {
            repo,
            branch,
            build,
        } => {
            apply_resource(
                &SourceBuild::new(
                    &tool.name,
                    repo,
                    branch.as_deref(),
                    build,
                    &ctx.home,
                    &*ctx.fetcher,
                    &*ctx.executor,
                ),
                ctx,
            )?;
        }
        Strategy::Manual { message, url } => {
            let mut text = format!("{}: {message}", tool.name);
            if let Some(url) = url {
                text.push_str(&format!(" ({url})"));
            }
            ctx.log.warn(&text);
            ctx.prompt.pause(&text)?;
        }
    }
    Ok(())
}

fn apply_resource(resource: &dyn Applicable, ctx: &Context) -> Result<()> {
    ctx.log.debug(&format!("installing {}", resource.description()));
    resource.apply()?;
    Ok(())
}

/// Run `post_install` commands; failures are only warned about.
fn run_post_install(tool: &Tool, ctx: &Context) {
    for command in &tool.post_install {
        ctx.log.debug(&format!("{}: post-install `{command}`", tool.name));
        if let Err(e) = ctx.executor.run_interactive("sh", &["-c", command]) {
            ctx.log
                .warn(&format!("{}: post-install `{command}` failed: {e:#}", tool.name));
        }
    }
}
