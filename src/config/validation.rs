//! Post-load configuration checks.
use std::collections::HashSet;
use std::path::Path;

use super::links::Link;
use super::tools::{Category, Tool};
use crate::platform::Platform;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g., "tools.toml", "links.toml").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Build a warning from its parts.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, root: &Path, platform: &Platform) -> Vec<ValidationWarning>;
}

/// Validator for the tool catalog.
#[derive(Debug)]
pub struct ToolValidator<'a> {
    categories: &'a [Category],
    tools: &'a [Tool],
}

impl<'a> ToolValidator<'a> {
    /// Validator over `categories` and `tools`.
    #[must_use]
    pub const fn new(categories: &'a [Category], tools: &'a [Tool]) -> Self {
        Self { categories, tools }
    }
}

impl ConfigValidator for ToolValidator<'_> {
    fn validate(&self, _root: &Path, platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let known: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let mut seen = HashSet::new();

        for tool in self.tools {
            if !seen.insert(tool.name.as_str()) {
                warnings.push(ValidationWarning::new(
                    "tools.toml",
                    &tool.name,
                    "tool is declared more than once",
                ));
            }

            if !known.contains(tool.category.as_str()) {
                warnings.push(ValidationWarning::new(
                    "tools.toml",
                    &tool.name,
                    format!(
                        "unknown category '{}'; the tool will never be installed",
                        tool.category
                    ),
                ));
            }

            if tool.install.values().all(Vec::is_empty) {
                warnings.push(ValidationWarning::new(
                    "tools.toml",
                    &tool.name,
                    "no install strategy for any package manager",
                ));
            } else if tool.applies_to(platform)
                && tool.strategies_for(platform.package_manager).is_empty()
            {
                warnings.push(ValidationWarning::new(
                    "tools.toml",
                    &tool.name,
                    format!("no install strategy for {}", platform.package_manager),
                ));
            }
        }

        warnings
    }
}

/// Validator for placement entries.
#[derive(Debug)]
pub struct LinkValidator<'a> {
    links: &'a [Link],
}

impl<'a> LinkValidator<'a> {
    /// Validator over `links`.
    #[must_use]
    pub const fn new(links: &'a [Link]) -> Self {
        Self { links }
    }
}

impl ConfigValidator for LinkValidator<'_> {
    fn validate(&self, root: &Path, platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for link in self.links.iter().filter(|l| l.applies_to(platform)) {
            let source_path = link.source_path(root);
            if !source_path.exists() {
                warnings.push(ValidationWarning::new(
                    "links.toml",
                    &link.source,
                    format!("source file does not exist: {}", source_path.display()),
                ));
            }

            if Path::new(&link.source).is_absolute() {
                warnings.push(ValidationWarning::new(
                    "links.toml",
                    &link.source,
                    "source path should be relative to the repository root",
                ));
            }

            if link.dest_escapes_home() {
                warnings.push(ValidationWarning::new(
                    "links.toml",
                    &link.dest,
                    "destination must stay inside the home directory; the link will be skipped",
                ));
            }
        }

        warnings
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &super::Config, platform: &Platform) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator + '_>> = vec![
        Box::new(ToolValidator::new(&config.categories, &config.tools)),
        Box::new(LinkValidator::new(&config.links)),
    ];

    validators
        .iter()
        .flat_map(|v| v.validate(&config.root, platform))
        .collect()
}
