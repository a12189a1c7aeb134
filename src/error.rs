//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error kinds
//!
//! ```text
//! PlatformError   unsupported OS or undetectable manager (fatal)
//! ConfigError     unreadable or malformed TOML (fatal)
//! InstallError    one tool failed to install (recorded)
//! PlacementError  a config link could not be placed (recorded)
//! ```

use thiserror::Error;

/// Errors raised while identifying the host platform.
///
/// Every variant aborts the run before any host state is mutated.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The operating system is neither Linux nor macOS.
    #[error("unsupported operating system '{0}' (only linux and macos are supported)")]
    UnsupportedOs(String),

    /// A Linux distribution whose package manager could not be inferred.
    #[error("cannot determine package manager for distribution '{distro}' (neither apt nor pacman found)")]
    UnknownPackageManager {
        /// Distribution id read from os-release (or `"unknown"`).
        distro: String,
    },

    /// The OS identity file could not be read.
    #[error("cannot read {path}: {source}")]
    OsRelease {
        /// Path of the identity file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from loading `conf/*.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected schema.
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        /// Path to the offending file.
        path: String,
        /// Underlying deserialisation error.
        source: toml::de::Error,
    },
}

/// A single tool's installation failed.
///
/// Permission failures from `sudo` surface as [`InstallError::Failed`] too:
/// the engine cannot tell them apart from any other non-zero exit.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The package manager invocation exited non-zero.
    #[error("{manager} failed to install [{}]: {reason}", .packages.join(", "))]
    Failed {
        /// Name of the package manager (or installer) that failed.
        manager: String,
        /// Packages requested in the failing invocation.
        packages: Vec<String>,
        /// Human-readable failure detail.
        reason: String,
    },

    /// The package index refresh failed.
    #[error("{manager} failed to refresh package indexes: {reason}")]
    IndexUpdate {
        /// Name of the package manager.
        manager: String,
        /// Human-readable failure detail.
        reason: String,
    },

    /// The strategy cannot run on the active package manager.
    #[error("'{strategy}' installs are not supported with {manager}")]
    Unsupported {
        /// Strategy kind (e.g. `"cask"`, `"aur"`).
        strategy: String,
        /// Name of the active package manager.
        manager: String,
    },

    /// A download or build step of a custom procedure failed.
    #[error("{step} failed for '{tool}': {reason}")]
    Procedure {
        /// Tool being installed.
        tool: String,
        /// Name of the failing step (e.g. `"download"`, `"build"`).
        step: String,
        /// Human-readable failure detail.
        reason: String,
    },
}

/// Errors raised by the file placement engine.
#[derive(Error, Debug)]
pub enum PlacementError {
    /// The pre-existing destination could not be moved into the backup directory.
    #[error("cannot back up {path}: {source}")]
    Backup {
        /// Destination that was being backed up.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The symlink itself could not be created or the old one removed.
    #[error("cannot link {dest} -> {source_path}: {source}")]
    Link {
        /// Destination path of the link.
        dest: String,
        /// Path the link should point at.
        source_path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unsupported_os_display() {
        let e = PlatformError::UnsupportedOs("windows".to_string());
        assert_eq!(
            e.to_string(),
            "unsupported operating system 'windows' (only linux and macos are supported)"
        );
    }

    #[test]
    fn unknown_package_manager_names_distro() {
        let e = PlatformError::UnknownPackageManager {
            distro: "gentoo".to_string(),
        };
        assert!(e.to_string().contains("'gentoo'"));
    }

    #[test]
    fn install_failed_lists_packages() {
        let e = InstallError::Failed {
            manager: "apt".to_string(),
            packages: vec!["git".to_string(), "curl".to_string()],
            reason: "exit 100".to_string(),
        };
        assert_eq!(e.to_string(), "apt failed to install [git, curl]: exit 100");
    }

    #[test]
    fn unsupported_strategy_display() {
        let e = InstallError::Unsupported {
            strategy: "cask".to_string(),
            manager: "pacman".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "'cask' installs are not supported with pacman"
        );
    }

    #[test]
    fn config_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "conf/tools.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("conf/tools.toml"));
    }

    #[test]
    fn placement_link_display() {
        let e = PlacementError::Link {
            dest: "/home/u/.zshrc".to_string(),
            source_path: "/repo/zsh/.zshrc".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/home/u/.zshrc -> /repo/zsh/.zshrc"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<PlatformError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<InstallError>();
        assert_send_sync::<PlacementError>();
    }

    #[test]
    fn install_error_converts_to_anyhow() {
        let e = InstallError::Procedure {
            tool: "nvim".to_string(),
            step: "download".to_string(),
            reason: "404".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
