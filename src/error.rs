//! Error types for llamastrap operations.
//!
//! This module defines [`StrapError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every fatal condition aborts the run; nothing is retried
//! - Use `anyhow::Error` (via `StrapError::Other`) for unexpected errors
//! - Every variant carries a remediation hint, see [`StrapError::hint`]

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for llamastrap operations.
#[derive(Debug, Error)]
pub enum StrapError {
    /// No supported system package manager could be found.
    #[error("No supported package manager found (tried {tried})")]
    PlatformUnsupported { tried: String },

    /// The detected package manager has no package for the tool.
    #[error("No {manager} package provides '{tool}'")]
    PackageUnavailable { tool: String, manager: String },

    /// The tool could not be found even after a successful install.
    #[error("'{tool}' is still not available after installation")]
    ToolStillAbsent { tool: String },

    /// The installed tool is older than required. Only ever reported as a warning.
    #[error("'{tool}' major version {found} is below the required minimum {minimum}")]
    VersionTooLow {
        tool: String,
        found: u32,
        minimum: u32,
    },

    /// An external command exited non-zero or could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    ExternalCommandFailed { command: String, code: Option<i32> },

    /// A tool needed by a non-install command is not installed.
    #[error("'{tool}' is not installed")]
    ToolNotInstalled { tool: String, target: String },

    /// A tool requirement violates its invariants.
    #[error("Invalid requirement for '{tool}': {message}")]
    InvalidRequirement { tool: String, message: String },

    /// An environment block violates its invariants.
    #[error("Invalid environment block '{marker}': {message}")]
    InvalidEnvBlock { marker: String, message: String },

    /// The profile file does not contain the block after appending it.
    #[error("Could not confirm environment block '{marker}' in {path}")]
    EnvWriteUnconfirmed { marker: String, path: PathBuf },

    /// Configuration file not found at the given location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The model file given to the server does not exist.
    #[error("Model file not found: {path}")]
    ModelNotFound { path: PathBuf },

    /// Target name is neither built in nor defined in the config file.
    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    /// The chat-completion request failed or returned an unusable response.
    #[error("Request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    /// The agent was still calling tools when it ran out of turns.
    #[error("Agent did not finish within {turns} turns")]
    AgentTurnLimit { turns: usize },

    /// The user answered no to an install confirmation.
    #[error("Installation of '{tool}' was declined")]
    InstallDeclined { tool: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrapError {
    /// Remediation hint shown after the diagnostic.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::PlatformUnsupported { .. } => Some(
                "Install the tool manually, or run on a system with apt-get, dnf, yum, pacman, zypper or brew."
                    .to_string(),
            ),
            Self::PackageUnavailable { tool, manager } => Some(format!(
                "Install '{}' manually; {} has no package for it on this platform.",
                tool, manager
            )),
            Self::ToolStillAbsent { tool } => Some(format!(
                "The install reported success but '{}' is not on PATH. Open a new shell or check the install location.",
                tool
            )),
            Self::VersionTooLow { tool, minimum, .. } => Some(format!(
                "Upgrade '{}' to major version {} or newer.",
                tool, minimum
            )),
            Self::ExternalCommandFailed { .. } => {
                Some("Check the command output above, fix the cause and re-run.".to_string())
            }
            Self::ToolNotInstalled { target, .. } => {
                Some(format!("Run 'llamastrap install {}' first.", target))
            }
            Self::InvalidRequirement { .. } | Self::ConfigValidationError { .. } => {
                Some("Fix the tool definition in your config file.".to_string())
            }
            Self::InvalidEnvBlock { .. } => {
                Some("Use a single-line marker and shell identifier keys.".to_string())
            }
            Self::EnvWriteUnconfirmed { path, .. } => Some(format!(
                "Check that {} is writable and the disk is not full.",
                path.display()
            )),
            Self::ConfigNotFound { .. } => {
                Some("Pass --config or set LLAMASTRAP_CONFIG to an existing file.".to_string())
            }
            Self::ConfigParseError { .. } => Some("Check the YAML syntax.".to_string()),
            Self::ModelNotFound { .. } => Some(
                "Pass --model or set LLAMASTRAP_MODEL to an existing GGUF file.".to_string(),
            ),
            Self::UnknownTarget { .. } => {
                Some("Run 'llamastrap targets' to list available targets.".to_string())
            }
            Self::RequestFailed { .. } => Some(
                "Start the server with 'llamastrap serve' and check --server-url.".to_string(),
            ),
            Self::AgentTurnLimit { .. } => Some(
                "Raise --max-turns or break the task into smaller steps.".to_string(),
            ),
            Self::InstallDeclined { .. } => {
                Some("Re-run with --yes to install without asking.".to_string())
            }
            Self::Io(_) | Self::Other(_) => None,
        }
    }
}

/// Result type alias for llamastrap operations.
pub type Result<T> = std::result::Result<T, StrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_unsupported_lists_tried_managers() {
        let err = StrapError::PlatformUnsupported {
            tried: "apt-get, dnf".into(),
        };
        assert!(err.to_string().contains("apt-get, dnf"));
        assert!(err.hint().is_some());
    }

    #[test]
    fn tool_still_absent_displays_tool() {
        let err = StrapError::ToolStillAbsent {
            tool: "nvcc".into(),
        };
        assert!(err.to_string().contains("nvcc"));
        assert!(err.hint().unwrap().contains("nvcc"));
    }

    #[test]
    fn version_too_low_displays_versions() {
        let err = StrapError::VersionTooLow {
            tool: "nvcc".into(),
            found: 7,
            minimum: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('8'));
    }

    #[test]
    fn external_command_failed_displays_command_and_code() {
        let err = StrapError::ExternalCommandFailed {
            command: "apt-get install -y cmake".into(),
            code: Some(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("apt-get install -y cmake"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn tool_not_installed_hint_names_target() {
        let err = StrapError::ToolNotInstalled {
            tool: "llama-server".into(),
            target: "llama-cpp".into(),
        };
        assert_eq!(
            err.hint().as_deref(),
            Some("Run 'llamastrap install llama-cpp' first.")
        );
    }

    #[test]
    fn env_write_unconfirmed_hint_names_path() {
        let err = StrapError::EnvWriteUnconfirmed {
            marker: "llamastrap cuda".into(),
            path: PathBuf::from("/home/dev/.bashrc"),
        };
        assert!(err.hint().unwrap().contains("/home/dev/.bashrc"));
    }

    #[test]
    fn new_variants_carry_actionable_hints() {
        let unavailable = StrapError::PackageUnavailable {
            tool: "nvcc".into(),
            manager: "brew".into(),
        };
        assert_eq!(unavailable.to_string(), "No brew package provides 'nvcc'");

        let model = StrapError::ModelNotFound {
            path: PathBuf::from("/models/missing.gguf"),
        };
        assert!(model.to_string().contains("/models/missing.gguf"));
        assert!(model.hint().unwrap().contains("--model"));

        let turns = StrapError::AgentTurnLimit { turns: 3 };
        assert!(turns.to_string().contains("3 turns"));
        assert!(turns.hint().unwrap().contains("--max-turns"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StrapError = io_err.into();
        assert!(matches!(err, StrapError::Io(_)));
        assert!(err.hint().is_none());
    }
}
