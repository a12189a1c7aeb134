//! Tool catalog loading (`conf/tools.toml`).
//!
//! ```toml
//! [[category]]
//! id = "editor"
//! title = "Editor"
//!
//! [[tool]]
//! name = "nvim"
//! category = "editor"
//! [tool.install]
//! pacman = ["neovim"]
//! brew = ["neovim"]
//! apt = [{ archive = { url = "https://example.invalid/nvim-{arch}.tar.gz", bin = "nvim/bin/nvim" } }]
//! ```
//!
//! A bare string in an install list is shorthand for `{ package = "..." }`.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;
use crate::platform::{PackageManager, Platform};

/// Install-list key applying to every package manager.
pub const ALL_MANAGERS: &str = "all";

/// An ordered stage of tools sharing one confirmation gate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Key that tools refer to.
    pub id: String,
    /// Display name used in the stage header and gate.
    pub title: String,
}

/// How presence of a tool is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// An executable name looked up on the search path.
    Command(String),
    /// A file relative to `$HOME` (fonts and other non-command payload).
    File(String),
}

/// One way of installing a tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Native package of the active manager.
    Package(String),
    /// Homebrew cask.
    Cask(String),
    /// Arch User Repository package, installed through a helper.
    Aur(String),
    /// Vendor installer script piped into a shell.
    Script {
        /// Installer URL.
        url: String,
        /// Arguments passed to the installer.
        #[serde(default)]
        args: Vec<String>,
        /// Interpreter the script is piped into.
        #[serde(default = "default_shell")]
        shell: String,
    },
    /// Release tarball extracted under `~/.local/opt/<tool>`.
    Archive {
        /// Download URL; `{os}` and `{arch}` are expanded.
        url: String,
        /// Path of the executable inside the extracted tree.
        bin: String,
        /// Expected digest of the download, hex encoded.
        #[serde(default)]
        sha256: Option<String>,
    },
    /// Clone and build.
    Source {
        /// Git URL.
        repo: String,
        /// Branch to check out instead of the default.
        #[serde(default)]
        branch: Option<String>,
        /// Shell commands run in the checkout, in order.
        build: Vec<String>,
    },
    /// Operator installs by hand; the run waits for confirmation.
    Manual {
        /// Instructions shown to the operator.
        message: String,
        /// Where to get the tool.
        #[serde(default)]
        url: Option<String>,
    },
}

fn default_shell() -> String {
    "sh".to_string()
}

impl Strategy {
    /// Short kind name used in log lines and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Package(_) => "package",
            Self::Cask(_) => "cask",
            Self::Aur(_) => "aur",
            Self::Script { .. } => "script",
            Self::Archive { .. } => "archive",
            Self::Source { .. } => "source",
            Self::Manual { .. } => "manual",
        }
    }
}

/// A tool to ensure is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Canonical command name.
    pub name: String,
    /// Id of the [`Category`] this tool is installed with.
    pub category: String,
    /// How presence is detected.
    pub check: Check,
    /// Applicability tags; empty means every platform.
    pub platforms: Vec<String>,
    /// Strategies keyed by package-manager key or [`ALL_MANAGERS`].
    pub install: BTreeMap<String, Vec<Strategy>>,
    /// Shell commands run after a fresh install.
    pub post_install: Vec<String>,
}

impl Tool {
    /// Whether this tool applies to `platform`.
    #[must_use]
    pub fn applies_to(&self, platform: &Platform) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|tag| platform.matches(tag))
    }

    /// Ordered strategies for `manager`, falling back to the `all` list.
    #[must_use]
    pub fn strategies_for(&self, manager: PackageManager) -> &[Strategy] {
        self.install
            .get(manager.key())
            .or_else(|| self.install.get(ALL_MANAGERS))
            .map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrategyEntry {
    Package(String),
    Tagged(Strategy),
}

impl From<StrategyEntry> for Strategy {
    fn from(entry: StrategyEntry) -> Self {
        match entry {
            StrategyEntry::Package(name) => Self::Package(name),
            StrategyEntry::Tagged(strategy) => strategy,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTool {
    name: String,
    category: String,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    platforms: Vec<String>,
    #[serde(default)]
    install: BTreeMap<String, Vec<StrategyEntry>>,
    #[serde(default)]
    post_install: Vec<String>,
}

impl From<RawTool> for Tool {
    fn from(raw: RawTool) -> Self {
        let check = match (raw.path, raw.command) {
            (Some(path), _) => Check::File(path),
            (None, Some(command)) => Check::Command(command),
            (None, None) => Check::Command(raw.name.clone()),
        };
        Self {
            name: raw.name,
            category: raw.category,
            check,
            platforms: raw.platforms,
            install: raw
                .install
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().map(Strategy::from).collect()))
                .collect(),
            post_install: raw.post_install,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolsFile {
    #[serde(default)]
    category: Vec<Category>,
    #[serde(default)]
    tool: Vec<RawTool>,
}

/// Load categories and tools from `tools.toml`, preserving file order.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be parsed.
pub fn load(path: &Path) -> Result<(Vec<Category>, Vec<Tool>), ConfigError> {
    let file: ToolsFile = toml_loader::load_config(path)?;
    Ok((
        file.category,
        file.tool.into_iter().map(Tool::from).collect(),
    ))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::test_helpers::write_temp_toml;
    use crate::platform::{Distro, Os};

    const SAMPLE: &str = r#"
[[category]]
id = "shell"
title = "Shell"

[[category]]
id = "fonts"
title = "Fonts"

[[tool]]
name = "zsh"
category = "shell"
[tool.install]
all = ["zsh"]

[[tool]]
name = "fira-code"
category = "fonts"
path = ".local/share/fonts/FiraCode-Regular.ttf"
platforms = ["linux"]
[tool.install]
pacman = ["ttf-fira-code"]
apt = [
  { archive = { url = "https://example.invalid/fira.tar.gz", bin = "FiraCode-Regular.ttf", sha256 = "abc" } },
  { manual = { message = "Install Fira Code", url = "https://example.invalid" } },
]
"#;

    #[test]
    fn load_preserves_category_order() {
        let (_dir, path) = write_temp_toml(SAMPLE);
        let (categories, tools) = load(&path).unwrap();
        let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["shell", "fonts"]);
        assert_eq!(tools.len(), 2);
    }

    #[test]
    fn bare_string_is_package_shorthand() {
        let (_dir, path) = write_temp_toml(SAMPLE);
        let (_, tools) = load(&path).unwrap();
        assert_eq!(
            tools[0].strategies_for(PackageManager::Brew),
            &[Strategy::Package("zsh".to_string())]
        );
    }

    #[test]
    fn check_defaults_to_tool_name() {
        let (_dir, path) = write_temp_toml(SAMPLE);
        let (_, tools) = load(&path).unwrap();
        assert_eq!(tools[0].check, Check::Command("zsh".to_string()));
        assert_eq!(
            tools[1].check,
            Check::File(".local/share/fonts/FiraCode-Regular.ttf".to_string())
        );
    }

    #[test]
    fn tagged_strategies_parse_in_order() {
        let (_dir, path) = write_temp_toml(SAMPLE);
        let (_, tools) = load(&path).unwrap();
        let apt = tools[1].strategies_for(PackageManager::Apt);
        assert_eq!(apt.len(), 2);
        assert!(matches!(
            &apt[0],
            Strategy::Archive { sha256: Some(sum), .. } if sum == "abc"
        ));
        assert_eq!(apt[1].kind(), "manual");
    }

    #[test]
    fn manager_specific_list_wins_over_all() {
        let (_dir, path) = write_temp_toml(
            r#"
[[tool]]
name = "fd"
category = "cli"
[tool.install]
apt = ["fd-find"]
all = ["fd"]
"#,
        );
        let (_, tools) = load(&path).unwrap();
        assert_eq!(
            tools[0].strategies_for(PackageManager::Apt),
            &[Strategy::Package("fd-find".to_string())]
        );
        assert_eq!(
            tools[0].strategies_for(PackageManager::Pacman),
            &[Strategy::Package("fd".to_string())]
        );
    }

    #[test]
    fn script_defaults() {
        let (_dir, path) = write_temp_toml(
            r#"
[[tool]]
name = "rustup"
category = "languages"
[tool.install]
all = [{ script = { url = "https://sh.rustup.rs", args = ["-y"] } }]
"#,
        );
        let (_, tools) = load(&path).unwrap();
        assert_eq!(
            tools[0].strategies_for(PackageManager::Apt),
            &[Strategy::Script {
                url: "https://sh.rustup.rs".to_string(),
                args: vec!["-y".to_string()],
                shell: "sh".to_string(),
            }]
        );
    }

    #[test]
    fn no_strategies_for_manager_is_empty() {
        let (_dir, path) = write_temp_toml(SAMPLE);
        let (_, tools) = load(&path).unwrap();
        assert!(tools[1].strategies_for(PackageManager::Brew).is_empty());
    }

    #[test]
    fn applicability_filter() {
        let (_dir, path) = write_temp_toml(SAMPLE);
        let (_, tools) = load(&path).unwrap();
        let mac = Platform::new(Os::MacOs, Distro::MacOs, PackageManager::Brew);
        let arch = Platform::new(Os::Linux, Distro::Arch, PackageManager::Pacman);
        assert!(tools[0].applies_to(&mac));
        assert!(!tools[1].applies_to(&mac));
        assert!(tools[1].applies_to(&arch));
    }

    #[test]
    fn unknown_tool_field_is_rejected() {
        let (_dir, path) = write_temp_toml(
            "[[tool]]\nname = \"x\"\ncategory = \"cli\"\ncheck = \"y\"\n",
        );
        assert!(load(&path).is_err());
    }

    #[test]
    fn missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (categories, tools) = load(&dir.path().join("tools.toml")).unwrap();
        assert!(categories.is_empty());
        assert!(tools.is_empty());
    }
}
