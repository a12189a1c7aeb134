//! Command: report which tools are present without changing anything.
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, StatusOpts};
use crate::logging::{Log, Logger};
use crate::provision;
use crate::tasks::Context;

/// Presence of one catalogued tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolReport {
    /// Tool name.
    pub name: String,
    /// Category id.
    pub category: String,
    /// Whether the tool is catalogued for this platform.
    pub applicable: bool,
    /// Whether the probe found it.
    pub present: bool,
    /// Resolved location when present.
    pub path: Option<PathBuf>,
}

/// Re-probe every tool in catalog order.
#[must_use]
pub fn collect(ctx: &Context) -> Vec<ToolReport> {
    ctx.config
        .tools
        .iter()
        .map(|tool| {
            let applicable = tool.applies_to(&ctx.platform);
            let path = if applicable {
                provision::locate(tool, ctx)
            } else {
                None
            };
            ToolReport {
                name: tool.name.clone(),
                category: tool.category.clone(),
                applicable,
                present: path.is_some(),
                path,
            }
        })
        .collect()
}

/// Log one line per applicable tool.
pub fn print_report(reports: &[ToolReport], log: &dyn Log) {
    log.stage("Tools");
    let width = reports.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let mut missing = 0u32;
    for report in reports.iter().filter(|r| r.applicable) {
        match &report.path {
            Some(path) => log.info(&format!(
                "\x1b[32m✓\x1b[0m {:width$}  {}",
                report.name,
                path.display()
            )),
            None => {
                missing += 1;
                log.info(&format!("\x1b[31m✗\x1b[0m {:width$}  (absent)", report.name));
            }
        }
    }
    if missing > 0 {
        log.warn(&format!("{missing} tool(s) absent"));
    }
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, the platform is
/// unsupported, or configuration fails to load.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &StatusOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, Arc::clone(log) as Arc<dyn Log>);
    let reports = collect(&ctx);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_report(&reports, &*ctx.log);
    }
    Ok(())
}
