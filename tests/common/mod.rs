// Shared helpers for integration tests.
//
// Provides a temporary repository and home directory, a recording host that
// stands in for both the executor and the capability probe, and a scripted
// prompt, so each integration test can drive whole stages without touching
// the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use devsetup_cli::config::Config;
use devsetup_cli::exec::{ExecResult, Executor};
use devsetup_cli::fetch::Fetcher;
use devsetup_cli::logging::Logger;
use devsetup_cli::platform::{Distro, Os, PackageManager, Platform};
use devsetup_cli::probe::Probe;
use devsetup_cli::prompt::Prompt;
use devsetup_cli::tasks::Context;

/// Catalog with three categories and one mac-only tool.
pub const TOOLS_TOML: &str = r#"
[[category]]
id = "shell"
title = "Shell"

[[category]]
id = "editor"
title = "Editor"

[[category]]
id = "cli"
title = "CLI"

[[tool]]
name = "zsh"
category = "shell"
[tool.install]
all = ["zsh"]

[[tool]]
name = "nvim"
category = "editor"
[tool.install]
all = ["neovim"]

[[tool]]
name = "jq"
category = "cli"
[tool.install]
all = ["jq"]

[[tool]]
name = "pbcopy"
category = "cli"
platforms = ["macos"]
"#;

/// Two placement entries, the second one mac-only.
pub const LINKS_TOML: &str = r#"
[[link]]
source = "home/.zshrc"
dest = "~/.zshrc"

[[link]]
source = "home/.config/nvim/init.lua"
dest = "~/.config/nvim/init.lua"

[[link]]
source = "macos/karabiner.json"
dest = "~/.config/karabiner/karabiner.json"
platforms = ["macos"]
"#;

/// Write the sample catalog, placement entries and payload into `root`.
pub fn setup_repo(root: &Path) {
    let conf = root.join("conf");
    std::fs::create_dir_all(&conf).expect("create conf dir");
    std::fs::write(conf.join("tools.toml"), TOOLS_TOML).expect("write tools.toml");
    std::fs::write(conf.join("links.toml"), LINKS_TOML).expect("write links.toml");

    for (path, content) in [
        ("home/.zshrc", "export EDITOR=nvim\n"),
        ("home/.config/nvim/init.lua", "vim.o.number = true\n"),
        ("macos/karabiner.json", "{}\n"),
    ] {
        let file = root.join(path);
        std::fs::create_dir_all(file.parent().expect("payload parent")).expect("create payload dir");
        std::fs::write(file, content).expect("write payload");
    }
}

#[must_use]
pub const fn debian() -> Platform {
    Platform::new(Os::Linux, Distro::Debian, PackageManager::Apt)
}

#[must_use]
pub const fn macos() -> Platform {
    Platform::new(Os::MacOs, Distro::MacOs, PackageManager::Brew)
}

/// Records every command and answers probes from a set of present tools.
///
/// A command line containing an install pattern makes the mapped tool
/// present afterwards; one containing a failure pattern exits non-zero.
#[derive(Debug, Default)]
pub struct RecordingHost {
    present: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    effects: Vec<(String, String)>,
    failures: Vec<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_present(self, names: &[&str]) -> Self {
        self.present
            .lock()
            .unwrap()
            .extend(names.iter().map(|s| (*s).to_string()));
        self
    }

    pub fn installs(mut self, pattern: &str, tool: &str) -> Self {
        self.effects.push((pattern.to_string(), tool.to_string()));
        self
    }

    pub fn failing(mut self, pattern: &str) -> Self {
        self.failures.push(pattern.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> anyhow::Result<()> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());
        if self.failures.iter().any(|p| line.contains(p.as_str())) {
            anyhow::bail!("{program} failed (exit 1)");
        }
        let mut present = self.present.lock().unwrap();
        for (pattern, tool) in &self.effects {
            if line.contains(pattern.as_str()) {
                present.insert(tool.clone());
            }
        }
        Ok(())
    }
}

impl Executor for RecordingHost {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.record(program, args)?;
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<()> {
        self.record(program, args)
    }

    fn run_interactive_in(
        &self,
        _dir: &Path,
        program: &str,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> anyhow::Result<()> {
        self.record(program, args)
    }
}

impl Probe for RecordingHost {
    fn locate(&self, command: &str) -> Option<PathBuf> {
        self.present
            .lock()
            .unwrap()
            .contains(command)
            .then(|| PathBuf::from("/usr/bin").join(command))
    }
}

/// Answers "yes" except to questions containing a declined pattern.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    declined: Vec<String>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn declining(patterns: &[&str]) -> Self {
        Self {
            declined: patterns.iter().map(|p| (*p).to_string()).collect(),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        self.asked.lock().unwrap().push(question.to_string());
        Ok(!self.declined.iter().any(|p| question.contains(p.as_str())))
    }

    fn pause(&self, _message: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Fetcher for runs that must never reach the network.
#[derive(Debug, Default)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("offline: {url}")
    }

    fn clone_repo(&self, url: &str, _branch: Option<String>, _dest: &Path) -> anyhow::Result<()> {
        anyhow::bail!("offline: {url}")
    }
}

/// An isolated repository and home directory backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    pub tmp: tempfile::TempDir,
    pub host: Arc<RecordingHost>,
    pub prompt: Arc<ScriptedPrompt>,
    pub logger: Arc<Logger>,
}

impl IntegrationTestContext {
    /// Sample repository, every gate answered "yes".
    pub fn new(host: RecordingHost) -> Self {
        Self::with_prompt(host, ScriptedPrompt::default())
    }

    pub fn with_prompt(host: RecordingHost, prompt: ScriptedPrompt) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        setup_repo(&tmp.path().join("repo"));
        std::fs::create_dir_all(tmp.path().join("home")).expect("create home");
        Self {
            tmp,
            host: Arc::new(host),
            prompt: Arc::new(prompt),
            logger: Arc::new(Logger::with_log_path(None)),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("repo")
    }

    pub fn home(&self) -> PathBuf {
        self.tmp.path().join("home")
    }

    pub fn load_config(&self) -> Config {
        Config::load(&self.root()).expect("load config")
    }

    /// A run context for `platform` wired to the recording host.
    pub fn context(&self, platform: Platform, dry_run: bool) -> Context {
        Context::new(
            self.load_config(),
            platform,
            self.logger.clone(),
            dry_run,
            self.home(),
        )
        .with_executor(self.host.clone())
        .with_probe(self.host.clone())
        .with_prompt(self.prompt.clone())
        .with_fetcher(Arc::new(OfflineFetcher))
        .with_login_shell("/bin/bash")
    }
}
