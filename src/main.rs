//! `devsetup` binary entry point.
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use devsetup_cli::cli::{Cli, Command};
use devsetup_cli::commands;
use devsetup_cli::logging::{Logger, init_subscriber};

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Some(Command::Completions { shell }) = &args.command {
        clap_complete::generate(*shell, &mut Cli::command(), "devsetup", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    init_subscriber(args.verbose, args.log_name());
    let log = Arc::new(Logger::new(args.log_name()));

    commands::install_interrupt_handler(&*log);

    let result = match &args.command {
        None => commands::install::run(&args.global, &log),
        Some(Command::Status(opts)) => commands::status::run(&args.global, opts, &log),
        Some(Command::Version) => {
            commands::version::run();
            Ok(())
        }
        Some(Command::Completions { .. }) => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
