//! Developer workstation provisioning engine.
//!
//! Detects the host platform, ensures a catalog of tools is present through
//! an ordered list of install strategies, links configuration files into
//! `$HOME` with backups, and switches the login shell to zsh. Everything is
//! driven by TOML files in `conf/`.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate the tool catalog and placement entries
//! - **[`resources`]**: idempotent check and apply primitives (packages, archives, links)
//! - **[`provision`]** and **[`tasks`]**: per-tool steps and the gated stages that run them
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod platform;
pub mod probe;
pub mod prompt;
pub mod provision;
pub mod resources;
pub mod tasks;
