//! Configuration loading from `conf/`.
pub mod links;
pub mod toml_loader;
pub mod tools;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// All loaded configuration for a run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Repository root that link sources are relative to.
    pub root: PathBuf,
    /// Stage order for tool installation.
    pub categories: Vec<tools::Category>,
    /// Tool catalog, in file order.
    pub tools: Vec<tools::Tool>,
    /// Placement entries.
    pub links: Vec<links::Link>,
}

impl Config {
    /// Load `conf/tools.toml` and `conf/links.toml` under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either file exists but is unreadable or
    /// invalid.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let conf = root.join("conf");
        let (categories, tools) = tools::load(&conf.join("tools.toml"))?;
        let links = links::load(&conf.join("links.toml"))?;

        Ok(Self {
            root: root.to_path_buf(),
            categories,
            tools,
            links,
        })
    }

    /// Tools belonging to `category`, in file order.
    pub fn tools_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a tools::Tool> {
        self.tools.iter().filter(move |t| t.category == category)
    }
}
