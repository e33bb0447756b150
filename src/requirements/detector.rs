//! Tool detection.
//!
//! The `Detector` resolves a requirement's executable and, only when it
//! resolves, runs the version query and compares the major version to the
//! minimum.

use crate::shell::{CommandRunner, Invocation};

use super::requirement::ToolRequirement;
use super::status::{Detection, VersionCheck};
use super::version::ParsedVersion;

/// Detects whether requirements are satisfied on the system.
pub struct Detector<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Detector<'a> {
    /// Create a detector that queries tools through `runner`.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Look for the tool and check its version.
    pub fn detect(&self, requirement: &ToolRequirement) -> Detection {
        let Some(path) = self
            .runner
            .resolve(requirement.name(), requirement.search_dirs())
        else {
            tracing::debug!("{} not found in search dirs or on PATH", requirement.name());
            return Detection::Absent;
        };

        tracing::debug!("{} resolved to {}", requirement.name(), path.display());

        let query = Invocation::new(path.to_string_lossy())
            .arg(requirement.version_arg())
            .captured();

        let parsed = match self.runner.run(&query) {
            Ok(result) if result.success => requirement.pattern().parse(result.version_output()),
            Ok(result) => ParsedVersion::Unparsable {
                reason: format!("version query exited with {:?}", result.exit_code),
            },
            Err(e) => ParsedVersion::Unparsable {
                reason: e.to_string(),
            },
        };

        let check = match parsed {
            ParsedVersion::Major(found) if found >= requirement.min_major() => {
                VersionCheck::Satisfied(found)
            }
            ParsedVersion::Major(found) => VersionCheck::TooLow {
                found,
                minimum: requirement.min_major(),
            },
            ParsedVersion::Unparsable { reason } => VersionCheck::Unparsable { reason },
        };

        tracing::debug!("{} version check: {:?}", requirement.name(), check);
        Detection::Present { path, check }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedRunner;
    use std::path::PathBuf;

    fn nvcc() -> ToolRequirement {
        ToolRequirement::new("nvcc", 8, r"release\s+(\d+)\.").unwrap()
    }

    #[test]
    fn absent_tool_spawns_nothing() {
        let runner = ScriptedRunner::new();
        let detection = Detector::new(&runner).detect(&nvcc());

        assert_eq!(detection, Detection::Absent);
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn present_tool_with_new_enough_version() {
        let runner = ScriptedRunner::new()
            .with_tool("nvcc", "/usr/local/cuda/bin/nvcc")
            .with_output("nvcc", "Cuda compilation tools, release 12.1, V12.1.66");

        let detection = Detector::new(&runner).detect(&nvcc());

        assert_eq!(
            detection,
            Detection::Present {
                path: PathBuf::from("/usr/local/cuda/bin/nvcc"),
                check: VersionCheck::Satisfied(12),
            }
        );
        assert_eq!(
            runner.command_lines(),
            vec!["/usr/local/cuda/bin/nvcc --version"]
        );
    }

    #[test]
    fn old_version_is_too_low() {
        let runner = ScriptedRunner::new()
            .with_tool("nvcc", "/usr/bin/nvcc")
            .with_output("nvcc", "release 7.5, V7.5.17");

        let detection = Detector::new(&runner).detect(&nvcc());

        assert!(matches!(
            detection,
            Detection::Present {
                check: VersionCheck::TooLow {
                    found: 7,
                    minimum: 8
                },
                ..
            }
        ));
    }

    #[test]
    fn unparsable_output_is_still_present() {
        let runner = ScriptedRunner::new()
            .with_tool("nvcc", "/usr/bin/nvcc")
            .with_output("nvcc", "Cuda compilation tools 12.1");

        let detection = Detector::new(&runner).detect(&nvcc());

        assert!(matches!(
            detection,
            Detection::Present {
                check: VersionCheck::Unparsable { .. },
                ..
            }
        ));
    }

    #[test]
    fn failing_version_query_is_unparsable() {
        let runner = ScriptedRunner::new()
            .with_tool("nvcc", "/usr/bin/nvcc")
            .with_failure("nvcc", 1);

        let detection = Detector::new(&runner).detect(&nvcc());

        assert!(matches!(
            detection,
            Detection::Present {
                check: VersionCheck::Unparsable { ref reason },
                ..
            } if reason.contains("Some(1)")
        ));
    }

    #[test]
    fn uses_configured_version_arg() {
        let req = ToolRequirement::new("llama-server", 1, r"version:\s*(\d+)")
            .unwrap()
            .with_version_arg("--version");
        let runner = ScriptedRunner::new()
            .with_tool("llama-server", "/opt/llama.cpp/build/bin/llama-server")
            .with_output("llama-server", "version: 4589 (a1b2c3d)\nbuilt with cc");

        let detection = Detector::new(&runner).detect(&req);

        assert!(matches!(
            detection,
            Detection::Present {
                check: VersionCheck::Satisfied(4589),
                ..
            }
        ));
    }
}
