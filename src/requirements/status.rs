//! Detection and install outcome types.
//!
//! Each detection produces a [`Detection`] describing whether and in what
//! version a tool is available; each bootstrap run ends in an
//! [`InstallResult`].

use std::path::PathBuf;

use crate::error::StrapError;

use super::version::ToolVersion;

/// How a present tool's version compares to the requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// Major version meets the minimum.
    Satisfied(u32),
    /// Major version is below the minimum. Warned about, never fatal.
    TooLow { found: u32, minimum: u32 },
    /// Version could not be determined. Warned about, never fatal.
    Unparsable { reason: String },
}

impl VersionCheck {
    /// The version to report for this check.
    pub fn version(&self) -> ToolVersion {
        match self {
            VersionCheck::Satisfied(m) => ToolVersion::Major(*m),
            VersionCheck::TooLow { found, .. } => ToolVersion::Major(*found),
            VersionCheck::Unparsable { .. } => ToolVersion::Unknown,
        }
    }

    /// Warning to show for this check, if any.
    pub fn warning(&self, tool: &str) -> Option<String> {
        match self {
            VersionCheck::Satisfied(_) => None,
            VersionCheck::TooLow { found, minimum } => Some(
                StrapError::VersionTooLow {
                    tool: tool.to_string(),
                    found: *found,
                    minimum: *minimum,
                }
                .to_string(),
            ),
            VersionCheck::Unparsable { reason } => Some(format!(
                "Could not determine the version of '{}' ({}); continuing",
                tool, reason
            )),
        }
    }
}

/// The result of looking for a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// The executable could not be resolved. No process was spawned.
    Absent,
    /// The executable was found and queried.
    Present { path: PathBuf, check: VersionCheck },
}

impl Detection {
    /// Whether the tool was found.
    pub fn is_present(&self) -> bool {
        matches!(self, Detection::Present { .. })
    }
}

/// Terminal outcome of bootstrapping one tool.
#[derive(Debug)]
pub enum InstallResult {
    /// The tool was already present.
    Skipped(ToolVersion),
    /// The tool was installed during this run.
    Installed(ToolVersion),
    /// The run aborted.
    Failed(StrapError),
}

impl InstallResult {
    /// Whether the run ended without a failure.
    pub fn is_success(&self) -> bool {
        !matches!(self, InstallResult::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfied_has_no_warning() {
        let check = VersionCheck::Satisfied(12);
        assert_eq!(check.version(), ToolVersion::Major(12));
        assert!(check.warning("nvcc").is_none());
    }

    #[test]
    fn too_low_warns_but_reports_version() {
        let check = VersionCheck::TooLow {
            found: 7,
            minimum: 8,
        };
        assert_eq!(check.version(), ToolVersion::Major(7));
        let warning = check.warning("nvcc").unwrap();
        assert!(warning.contains("nvcc"));
        assert!(warning.contains("minimum 8"));
    }

    #[test]
    fn unparsable_warns_with_reason() {
        let check = VersionCheck::Unparsable {
            reason: "no line matches".to_string(),
        };
        assert_eq!(check.version(), ToolVersion::Unknown);
        assert!(check.warning("nvcc").unwrap().contains("no line matches"));
    }

    #[test]
    fn detection_presence() {
        assert!(!Detection::Absent.is_present());
        assert!(Detection::Present {
            path: PathBuf::from("/usr/bin/nvcc"),
            check: VersionCheck::Satisfied(12),
        }
        .is_present());
    }

    #[test]
    fn failed_result_is_not_success() {
        let failed = InstallResult::Failed(StrapError::ToolStillAbsent {
            tool: "nvcc".into(),
        });
        assert!(!failed.is_success());
        assert!(InstallResult::Skipped(ToolVersion::Unknown).is_success());
        assert!(InstallResult::Installed(ToolVersion::Major(12)).is_success());
    }
}
