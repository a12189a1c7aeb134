//! Placement entries (`conf/links.toml`).
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use super::toml_loader;
use crate::error::ConfigError;
use crate::platform::Platform;

/// A configuration file to link into `$HOME`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    /// Path relative to the repository root.
    pub source: String,
    /// Path relative to `$HOME`; a leading `~/` is accepted.
    pub dest: String,
    /// Applicability tags; empty means every platform.
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl Link {
    /// Absolute source path under `root`.
    #[must_use]
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source)
    }

    /// Absolute destination path under `home`.
    #[must_use]
    pub fn dest_path(&self, home: &Path) -> PathBuf {
        let rel = self
            .dest
            .strip_prefix("~/")
            .unwrap_or_else(|| self.dest.trim_start_matches('~'));
        home.join(rel.trim_start_matches('/'))
    }

    /// Whether `dest` climbs out of `$HOME` through a `..` component.
    #[must_use]
    pub fn dest_escapes_home(&self) -> bool {
        Path::new(&self.dest)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    }

    /// Whether the entry applies to `platform`.
    #[must_use]
    pub fn applies_to(&self, platform: &Platform) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|tag| platform.matches(tag))
    }
}

#[derive(Debug, Deserialize)]
struct LinksFile {
    #[serde(default)]
    link: Vec<Link>,
}

/// Load placement entries from `links.toml`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be parsed.
pub fn load(path: &Path) -> Result<Vec<Link>, ConfigError> {
    let file: LinksFile = toml_loader::load_config(path)?;
    Ok(file.link)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::test_helpers::write_temp_toml;
    use crate::platform::{Distro, Os, PackageManager};

    #[test]
    fn load_links() {
        let (_dir, path) = write_temp_toml(
            r#"
[[link]]
source = "zsh/.zshrc"
dest = "~/.zshrc"

[[link]]
source = "i3/config"
dest = ".config/i3/config"
platforms = ["linux"]
"#,
        );
        let links = load(&path).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].source, "zsh/.zshrc");
        assert_eq!(links[1].platforms, vec!["linux"]);
    }

    #[test]
    fn dest_path_strips_tilde() {
        let link = Link {
            source: "zsh/.zshrc".to_string(),
            dest: "~/.zshrc".to_string(),
            platforms: Vec::new(),
        };
        assert_eq!(
            link.dest_path(Path::new("/home/u")),
            PathBuf::from("/home/u/.zshrc")
        );
        assert_eq!(
            link.source_path(Path::new("/repo")),
            PathBuf::from("/repo/zsh/.zshrc")
        );
    }

    #[test]
    fn dest_path_plain_relative() {
        let link = Link {
            source: "a".to_string(),
            dest: ".config/nvim".to_string(),
            platforms: Vec::new(),
        };
        assert_eq!(
            link.dest_path(Path::new("/home/u")),
            PathBuf::from("/home/u/.config/nvim")
        );
    }

    #[test]
    fn parent_components_escape_home() {
        let link = |dest: &str| Link {
            source: "a".to_string(),
            dest: dest.to_string(),
            platforms: Vec::new(),
        };
        assert!(link("~/../etc/profile").dest_escapes_home());
        assert!(link(".config/../../x").dest_escapes_home());
        assert!(!link("~/.config/nvim").dest_escapes_home());
        assert!(!link("~/..hidden").dest_escapes_home());
    }

    #[test]
    fn platform_filter() {
        let link = Link {
            source: "a".to_string(),
            dest: "b".to_string(),
            platforms: vec!["macos".to_string()],
        };
        let mac = Platform::new(Os::MacOs, Distro::MacOs, PackageManager::Brew);
        let deb = Platform::new(Os::Linux, Distro::Debian, PackageManager::Apt);
        assert!(link.applies_to(&mac));
        assert!(!link.applies_to(&deb));
    }

    #[test]
    fn missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("links.toml")).unwrap().is_empty());
    }
}
