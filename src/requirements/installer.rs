//! Tool installation.
//!
//! Installs a missing tool either through the system package manager or
//! by building it from source. Every external command must exit 0; the
//! first failure aborts the install with no retry.

use std::collections::HashMap;

use crate::detection::{detect_package_manager, PackageManager};
use crate::error::{Result, StrapError};
use crate::shell::{is_elevated, CommandRunner, Invocation};
use crate::source::{SourceBuild, SourceInstaller};
use crate::ui::UserInterface;

/// Packages that provide a tool, with per-manager overrides.
#[derive(Debug, Clone, Default)]
pub struct PackageSpec {
    packages: Vec<String>,
    overrides: HashMap<PackageManager, Vec<String>>,
}

impl PackageSpec {
    /// Packages used with every manager that has no override.
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            overrides: HashMap::new(),
        }
    }

    /// Use different package names for one manager.
    pub fn with_override<I, S>(mut self, manager: PackageManager, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides
            .insert(manager, packages.into_iter().map(Into::into).collect());
        self
    }

    /// Package names to install with `manager`.
    pub fn packages_for(&self, manager: PackageManager) -> &[String] {
        self.overrides
            .get(&manager)
            .map(Vec::as_slice)
            .unwrap_or(&self.packages)
    }
}

/// How a missing tool gets installed.
#[derive(Debug, Clone)]
pub enum InstallMethod {
    /// Install through the system package manager.
    Packages(PackageSpec),
    /// Clone a repository and build it with CMake.
    Source(SourceBuild),
}

impl InstallMethod {
    /// Short description for confirmations and logs.
    pub fn describe(&self) -> String {
        match self {
            InstallMethod::Packages(spec) => {
                format!("system packages ({})", spec.packages.join(", "))
            }
            InstallMethod::Source(build) => {
                format!("source build of {} into {}", build.repo_url, build.root.display())
            }
        }
    }
}

/// How package manager commands get root privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Already running as root.
    Root,
    /// Prefix commands with `sudo`.
    Sudo,
    /// Run as the current user and let the command fail if it needs root.
    User,
}

impl Privilege {
    /// Detect the privilege strategy for this process.
    pub fn detect(runner: &dyn CommandRunner) -> Self {
        if is_elevated() {
            Privilege::Root
        } else if runner.resolve("sudo", &[]).is_some() {
            Privilege::Sudo
        } else {
            Privilege::User
        }
    }

    /// Wrap an invocation for a manager that may need root.
    pub fn apply(&self, manager: PackageManager, invocation: Invocation) -> Invocation {
        if *self != Privilege::Sudo || !manager.needs_root() {
            return invocation;
        }

        let mut wrapped = Invocation::new("sudo")
            .arg(invocation.program)
            .args(invocation.args);
        wrapped.cwd = invocation.cwd;
        wrapped.capture = invocation.capture;
        wrapped
    }
}

/// Installs missing tools.
pub struct Installer<'a> {
    runner: &'a dyn CommandRunner,
    privilege: Privilege,
}

impl<'a> Installer<'a> {
    /// Create an installer with an explicit privilege strategy.
    pub fn new(runner: &'a dyn CommandRunner, privilege: Privilege) -> Self {
        Self { runner, privilege }
    }

    /// Install `tool` with `method`.
    pub fn install(
        &self,
        tool: &str,
        method: &InstallMethod,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        match method {
            InstallMethod::Packages(spec) => self.install_packages(tool, spec, ui),
            InstallMethod::Source(build) => {
                let revision = SourceInstaller::new(self.runner).install(build, ui)?;
                tracing::info!("Built {} from {}", tool, revision);
                Ok(())
            }
        }
    }

    /// Install `tool` through the detected package manager.
    pub fn install_packages(
        &self,
        tool: &str,
        spec: &PackageSpec,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let manager =
            detect_package_manager(self.runner).ok_or_else(|| StrapError::PlatformUnsupported {
                tried: PackageManager::all_programs(),
            })?;

        let packages = spec.packages_for(manager);
        if packages.is_empty() {
            return Err(StrapError::PackageUnavailable {
                tool: tool.to_string(),
                manager: manager.to_string(),
            });
        }

        if let Some(refresh) = manager.refresh_command() {
            let refresh = self.privilege.apply(manager, refresh);
            ui.message(&format!("Refreshing package index: {}", refresh.display()));
            self.runner.run_checked(&refresh)?;
        }

        let install = self.privilege.apply(manager, manager.install_command(packages));
        ui.message(&format!("Installing {}: {}", tool, install.display()));
        tracing::info!("Installing {} with {}", tool, manager);
        self.runner.run_checked(&install)?;

        Ok(())
    }
}
