//! Command-line interface definition.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "devsetup",
    about = "Provision a developer workstation from a declarative catalog",
    version
)]
pub struct Cli {
    /// Subcommand; the full install workflow runs when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// Name used for the log file of this invocation.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self.command {
            None => "install",
            Some(Command::Status(_)) => "status",
            Some(Command::Completions { .. }) => "completions",
            Some(Command::Version) => "version",
        }
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Repository root containing conf/ (defaults to DEVSETUP_ROOT, then auto-detection)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report which tools are present without changing anything
    Status(StatusOpts),
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `status` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct StatusOpts {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
