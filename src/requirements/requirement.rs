//! Tool requirement definitions.

use std::path::PathBuf;

use crate::error::{Result, StrapError};

use super::version::VersionPattern;

/// What a tool must look like to count as installed.
///
/// The minimum major version is positive and the extraction pattern has
/// exactly one capture group; both are checked by [`ToolRequirement::new`].
#[derive(Debug, Clone)]
pub struct ToolRequirement {
    name: String,
    min_major: u32,
    pattern: VersionPattern,
    version_arg: String,
    search_dirs: Vec<PathBuf>,
}

impl ToolRequirement {
    /// Create a requirement for executable `name`.
    pub fn new(name: &str, min_major: u32, pattern: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(StrapError::InvalidRequirement {
                tool: name.to_string(),
                message: "tool name is empty".to_string(),
            });
        }

        if min_major == 0 {
            return Err(StrapError::InvalidRequirement {
                tool: name.to_string(),
                message: "minimum major version must be a positive integer".to_string(),
            });
        }

        let pattern = VersionPattern::new(pattern).map_err(|message| {
            StrapError::InvalidRequirement {
                tool: name.to_string(),
                message,
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            min_major,
            pattern,
            version_arg: "--version".to_string(),
            search_dirs: Vec::new(),
        })
    }

    /// Use a different version-query argument than `--version`.
    pub fn with_version_arg(mut self, arg: impl Into<String>) -> Self {
        self.version_arg = arg.into();
        self
    }

    /// Also look for the executable in `dir` when it isn't on PATH.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_major(&self) -> u32 {
        self.min_major
    }

    pub fn pattern(&self) -> &VersionPattern {
        &self.pattern
    }

    pub fn version_arg(&self) -> &str {
        &self.version_arg
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let req = ToolRequirement::new("nvcc", 8, r"release\s+(\d+)\.").unwrap();
        assert_eq!(req.name(), "nvcc");
        assert_eq!(req.min_major(), 8);
        assert_eq!(req.version_arg(), "--version");
        assert!(req.search_dirs().is_empty());
    }

    #[test]
    fn builder_sets_arg_and_dirs() {
        let req = ToolRequirement::new("nvcc", 8, r"release\s+(\d+)\.")
            .unwrap()
            .with_version_arg("-V")
            .with_search_dir("/usr/local/cuda/bin");
        assert_eq!(req.version_arg(), "-V");
        assert_eq!(req.search_dirs(), &[PathBuf::from("/usr/local/cuda/bin")]);
    }

    #[test]
    fn zero_minimum_is_rejected() {
        let err = ToolRequirement::new("nvcc", 0, r"release\s+(\d+)\.").unwrap_err();
        assert!(matches!(err, StrapError::InvalidRequirement { .. }));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn pattern_without_group_is_rejected() {
        let err = ToolRequirement::new("cmake", 3, r"cmake version \d+").unwrap_err();
        assert!(err.to_string().contains("cmake"));
        assert!(err.to_string().contains("capture group"));
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(ToolRequirement::new("  ", 1, r"(\d+)").is_err());
    }
}
