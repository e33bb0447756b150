//! System package manager detection.

use std::fmt;

use crate::shell::{CommandRunner, Invocation};

/// A supported system package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Homebrew,
}

impl PackageManager {
    /// Detection order.
    pub const ALL: [PackageManager; 6] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
        PackageManager::Homebrew,
    ];

    /// Executable name.
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Homebrew => "brew",
        }
    }

    /// Short name used for per-manager package overrides in config.
    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Homebrew => "brew",
        }
    }

    /// Parse a short name as used in config files.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pm| pm.name() == name)
    }

    /// Whether installs need root privileges.
    pub fn needs_root(&self) -> bool {
        !matches!(self, PackageManager::Homebrew)
    }

    /// Index refresh to run before installing, if the manager needs one.
    pub fn refresh_command(&self) -> Option<Invocation> {
        match self {
            PackageManager::Apt => Some(Invocation::new(self.program()).arg("update")),
            _ => None,
        }
    }

    /// Non-interactive install command for `packages`.
    pub fn install_command(&self, packages: &[String]) -> Invocation {
        let base = Invocation::new(self.program());
        let base = match self {
            PackageManager::Apt | PackageManager::Dnf | PackageManager::Yum => {
                base.args(["install", "-y"])
            }
            PackageManager::Pacman => base.args(["-S", "--noconfirm", "--needed"]),
            PackageManager::Zypper => base.args(["--non-interactive", "install"]),
            PackageManager::Homebrew => base.arg("install"),
        };
        base.args(packages.iter().cloned())
    }

    /// Comma-separated list of all programs, for diagnostics.
    pub fn all_programs() -> String {
        Self::ALL
            .iter()
            .map(|pm| pm.program())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Detect the first available package manager.
pub fn detect_package_manager(runner: &dyn CommandRunner) -> Option<PackageManager> {
    let found = PackageManager::ALL
        .into_iter()
        .find(|pm| runner.resolve(pm.program(), &[]).is_some());
    tracing::debug!("Detected package manager: {:?}", found);
    found
}
