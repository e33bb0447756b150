//! Configuration file discovery and loading.

use crate::config::schema::StrapConfig;
use crate::error::{Result, StrapError};
use std::fs;
use std::path::{Path, PathBuf};

/// `<config_dir>/llamastrap/config.yml`, e.g. `~/.config/llamastrap/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("llamastrap").join("config.yml"))
}

/// Load the config.
///
/// An explicit path must exist. Without one, the default location is used
/// when it exists and an empty config otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<StrapConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => match default_config_path() {
            Some(path) if path.exists() => load_config_file(&path),
            _ => {
                tracing::debug!("No config file, using built-in targets only");
                Ok(StrapConfig::default())
            }
        },
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<StrapConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StrapError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StrapError::Io(e)
        }
    })?;

    tracing::debug!("Loaded config from {}", path.display());
    parse_config(&content, path)
}

/// Parse YAML content. `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<StrapConfig> {
    // An empty file deserializes to null, not an empty mapping.
    if content.trim().is_empty() {
        return Ok(StrapConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| StrapError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
