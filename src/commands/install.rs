//! Command: the full interactive provisioning workflow.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, status, version};
use crate::cli::GlobalOpts;
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context};

/// Run every stage, then print the summary and the tool report.
///
/// Step and stage failures are reported but do not make the command fail.
///
/// # Errors
///
/// Returns an error only for precondition failures: unresolvable root,
/// unsupported platform or unreadable configuration.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("devsetup {}", version::version()));
    if global.dry_run {
        log.info("dry run: no changes will be made");
    }

    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, Arc::clone(log) as Arc<dyn Log>);

    run_stages(&ctx);

    log.print_summary();
    status::print_report(&status::collect(&ctx), &*ctx.log);

    let failures = log.failure_count();
    if failures > 0 {
        log.warn(&format!("{failures} stage(s) reported failures; see the log"));
    }
    Ok(())
}

/// Execute the install stages in order against `ctx`.
pub fn run_stages(ctx: &Context) {
    for task in tasks::install_tasks(&ctx.config) {
        tasks::execute(task.as_ref(), ctx);
    }
}
