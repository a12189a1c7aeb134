//! Process execution behind an injectable [`Executor`].
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a captured command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
///
/// Every host mutation the engine performs (package installs, vendor scripts,
/// builds, `chsh`) goes through this trait so that provisioning logic can be
/// exercised in tests with a recording executor instead of a real system.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command with captured output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command attached to the terminal so the operator sees installer
    /// output and can answer `sudo` password prompts.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<()>;

    /// Like [`run_interactive`](Self::run_interactive), in `dir` with extra
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_interactive_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<()>;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        let result = ExecResult::from(output);
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<()> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        wait_inherited(cmd, program)
    }

    fn run_interactive_in(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<()> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        for (k, v) in env {
            cmd.env(k, v);
        }
        wait_inherited(cmd, &format!("{program} in {}", dir.display()))
    }
}

/// Spawn `cmd` with the parent's stdio and wait, bailing on non-zero exit.
fn wait_inherited(mut cmd: Command, label: &str) -> Result<()> {
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to execute: {label}"))?;
    if !status.success() {
        bail!("{label} failed (exit {})", status.code().unwrap_or(-1));
    }
    Ok(())
}

/// Build the `sh -c` command line that pipes a remote installer into a shell.
///
/// Arguments are single-quoted so that flags such as `--no-modify-path`
/// reach the installer verbatim.
#[must_use]
pub fn piped_script(url: &str, shell: &str, args: &[String]) -> String {
    let mut line = format!("curl -fsSL {} | {shell}", shell_quote(url));
    if !args.is_empty() {
        line.push_str(" -s --");
        for arg in args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
    }
    line
}

/// Quote `s` for a POSIX shell.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
