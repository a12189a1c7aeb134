//! Host platform detection.
use std::fmt;

use crate::error::PlatformError;
use crate::probe::Probe;

/// Path of the Linux OS identity file.
pub const OS_RELEASE: &str = "/etc/os-release";

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Any Linux distribution.
    Linux,
    /// macOS.
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

/// Distribution family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    /// Debian, Ubuntu and derivatives.
    Debian,
    /// Arch Linux and derivatives.
    Arch,
    /// macOS.
    MacOs,
    /// Unrecognised distribution; the manager was found by probing.
    Unknown,
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => write!(f, "debian"),
            Self::Arch => write!(f, "arch"),
            Self::MacOs => write!(f, "macos"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Native package manager of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// `apt-get`.
    Apt,
    /// `pacman`.
    Pacman,
    /// Homebrew.
    Brew,
}

impl PackageManager {
    /// Key used for this manager in `conf/tools.toml` strategy tables.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Pacman => "pacman",
            Self::Brew => "brew",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Platform information for the current system.
///
/// Detected once per run and handed to every component through the task
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
    /// Distribution family.
    pub distro: Distro,
    /// Native package manager.
    pub package_manager: PackageManager,
}

impl Platform {
    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, distro: Distro, package_manager: PackageManager) -> Self {
        Self {
            os,
            distro,
            package_manager,
        }
    }

    /// Detect the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the OS is unsupported or the Linux
    /// package manager cannot be determined.
    pub fn detect(probe: &dyn Probe) -> Result<Self, PlatformError> {
        let os_release = if std::env::consts::OS == "linux" {
            Some(
                std::fs::read_to_string(OS_RELEASE).map_err(|source| PlatformError::OsRelease {
                    path: OS_RELEASE.to_string(),
                    source,
                })?,
            )
        } else {
            None
        };
        Self::detect_from(std::env::consts::OS, os_release.as_deref(), probe)
    }

    /// Pure detection from an OS name, the os-release contents and a probe.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the OS is unsupported or the Linux
    /// package manager cannot be determined.
    pub fn detect_from(
        os: &str,
        os_release: Option<&str>,
        probe: &dyn Probe,
    ) -> Result<Self, PlatformError> {
        match os {
            "macos" => Ok(Self::new(Os::MacOs, Distro::MacOs, PackageManager::Brew)),
            "linux" => {
                let release = OsRelease::parse(os_release.unwrap_or_default());
                let distro = release.family();
                let package_manager = match distro {
                    Distro::Debian => PackageManager::Apt,
                    Distro::Arch => PackageManager::Pacman,
                    Distro::MacOs | Distro::Unknown => {
                        if probe.is_present("apt-get") || probe.is_present("apt") {
                            PackageManager::Apt
                        } else if probe.is_present("pacman") {
                            PackageManager::Pacman
                        } else {
                            return Err(PlatformError::UnknownPackageManager {
                                distro: release.id.unwrap_or_else(|| "unknown".to_string()),
                            });
                        }
                    }
                };
                Ok(Self::new(Os::Linux, distro, package_manager))
            }
            other => Err(PlatformError::UnsupportedOs(other.to_string())),
        }
    }

    /// Whether this is a Linux host.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// Whether this is a macOS host.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }

    /// Whether this host uses pacman and can reach the AUR.
    #[must_use]
    pub fn is_arch(&self) -> bool {
        self.package_manager == PackageManager::Pacman
    }

    /// Whether an applicability tag matches this platform.
    ///
    /// Tags may name an OS (`linux`, `macos`), a distro family (`debian`,
    /// `arch`) or a package manager (`apt`, `pacman`, `brew`).
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        tag == self.os.to_string()
            || tag == self.distro.to_string()
            || tag == self.package_manager.key()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.os, self.distro, self.package_manager)
    }
}

const DEBIAN_IDS: &[&str] = &[
    "debian",
    "ubuntu",
    "linuxmint",
    "pop",
    "elementary",
    "raspbian",
    "kali",
    "zorin",
];

const ARCH_IDS: &[&str] = &[
    "arch",
    "manjaro",
    "endeavouros",
    "garuda",
    "artix",
    "cachyos",
];

/// The fields of `/etc/os-release` that matter for detection.
#[derive(Debug, Default, PartialEq, Eq)]
struct OsRelease {
    id: Option<String>,
    id_like: Vec<String>,
}

impl OsRelease {
    fn parse(text: &str) -> Self {
        let mut release = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            match key.trim() {
                "ID" => release.id = Some(value.to_ascii_lowercase()),
                "ID_LIKE" => {
                    release.id_like = value
                        .split_whitespace()
                        .map(str::to_ascii_lowercase)
                        .collect();
                }
                _ => {}
            }
        }
        release
    }

    /// `ID` is checked first, then each `ID_LIKE` entry.
    fn family(&self) -> Distro {
        self.id
            .iter()
            .chain(self.id_like.iter())
            .find_map(|id| classify(id))
            .unwrap_or(Distro::Unknown)
    }
}

fn classify(id: &str) -> Option<Distro> {
    if DEBIAN_IDS.contains(&id) {
        Some(Distro::Debian)
    } else if ARCH_IDS.contains(&id) {
        Some(Distro::Arch)
    } else {
        None
    }
}
