//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrapConfig {
    /// Profile file to append exports to. `--profile-file` wins over this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_file: Option<String>,

    /// Extra package-installed tools, keyed by target name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, ToolConfig>,
}

/// A tool installed through the system package manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Executable name. Defaults to the target name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Listing description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Argument that makes the tool print its version.
    #[serde(default = "default_version_arg")]
    pub version_arg: String,

    /// Regex with exactly one capture group for the major version.
    pub version_pattern: String,

    /// Minimum acceptable major version.
    pub min_major: u32,

    /// Directories searched after PATH. A leading `~/` is expanded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<String>,

    /// Packages to install.
    pub packages: Vec<String>,

    /// Package names for specific managers (`apt`, `dnf`, `yum`, `pacman`, `zypper`, `brew`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package_overrides: BTreeMap<String, Vec<String>>,

    /// Exports appended to the profile after a fresh install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvConfig>,
}

fn default_version_arg() -> String {
    "--version".to_string()
}

/// A profile block definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    pub marker: String,
    pub exports: Vec<ExportConfig>,
}

/// One `export KEY="VALUE"` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    pub key: String,
    pub value: String,
}
