//! Configuration validation and conversion to targets.
//!
//! All problems in a config file are collected before reporting, so users
//! can fix several at once. Each problem names the tool and field.

use std::collections::HashMap;
use std::fmt;

use crate::bootstrap::{Target, CUDA_MARKER, CUDA_TARGET, LLAMA_CPP_MARKER, LLAMA_CPP_TARGET};
use crate::config::schema::{StrapConfig, ToolConfig};
use crate::detection::PackageManager;
use crate::error::{Result, StrapError};
use crate::profile::EnvBlock;
use crate::requirements::{InstallMethod, PackageSpec, ToolRequirement, VersionPattern};
use crate::shell::expand_home;

/// One problem in a tool definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub tool: String,
    /// Field name, or `None` for problems with the tool as a whole.
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "tools.{}.{}: {}", self.tool, field, self.message),
            None => write!(f, "tools.{}: {}", self.tool, self.message),
        }
    }
}

/// Validate every tool definition and return all errors.
pub fn validate_config(config: &StrapConfig) -> Vec<ValidationError> {
    let mut errors: Vec<_> = config
        .tools
        .iter()
        .flat_map(|(name, tool)| validate_tool(name, tool))
        .collect();
    errors.extend(duplicate_markers(config));
    errors
}

/// Env block markers must be unique across built-in and config targets,
/// otherwise the later block is never written.
fn duplicate_markers(config: &StrapConfig) -> Vec<ValidationError> {
    let mut owners: HashMap<&str, &str> =
        HashMap::from([(CUDA_MARKER, CUDA_TARGET), (LLAMA_CPP_MARKER, LLAMA_CPP_TARGET)]);
    let mut errors = Vec::new();

    for (name, tool) in &config.tools {
        let Some(env) = &tool.env else { continue };
        match owners.get(env.marker.as_str()) {
            Some(owner) => errors.push(ValidationError {
                tool: name.clone(),
                field: Some("env".to_string()),
                message: format!("marker '{}' is already used by '{}'", env.marker, owner),
            }),
            None => {
                owners.insert(&env.marker, name);
            }
        }
    }

    errors
}

fn validate_tool(name: &str, tool: &ToolConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut push = |field: Option<&str>, message: String| {
        errors.push(ValidationError {
            tool: name.to_string(),
            field: field.map(str::to_string),
            message,
        })
    };

    if name == CUDA_TARGET || name == LLAMA_CPP_TARGET {
        push(None, "name collides with a built-in target".to_string());
    }

    if tool.command.as_deref().is_some_and(|c| c.trim().is_empty()) {
        push(Some("command"), "must not be empty".to_string());
    }

    if let Err(message) = VersionPattern::new(&tool.version_pattern) {
        push(Some("version_pattern"), message);
    }

    if tool.min_major == 0 {
        push(Some("min_major"), "must be a positive integer".to_string());
    }

    if tool.packages.is_empty() {
        push(Some("packages"), "at least one package is required".to_string());
    }

    for manager in tool.package_overrides.keys() {
        if PackageManager::from_name(manager).is_none() {
            push(
                Some("package_overrides"),
                format!("unknown package manager '{}'", manager),
            );
        }
    }

    if let Some(env) = &tool.env {
        if let Err(StrapError::InvalidEnvBlock { message, .. }) = env_block(env).validate() {
            push(Some("env"), message);
        }
    }

    errors
}

/// Validate the config and build a target for every tool.
pub fn config_targets(config: &StrapConfig) -> Result<Vec<Target>> {
    let errors = validate_config(config);
    if !errors.is_empty() {
        return Err(StrapError::ConfigValidationError {
            message: errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        });
    }

    config
        .tools
        .iter()
        .map(|(name, tool)| tool_target(name, tool))
        .collect()
}

fn tool_target(name: &str, tool: &ToolConfig) -> Result<Target> {
    let command = tool.command.as_deref().unwrap_or(name);
    let requirement = tool.search_paths.iter().fold(
        ToolRequirement::new(command, tool.min_major, &tool.version_pattern)?
            .with_version_arg(tool.version_arg.clone()),
        |req, dir| req.with_search_dir(expand_home(dir)),
    );

    let mut packages = PackageSpec::new(tool.packages.iter().cloned());
    for (manager, names) in &tool.package_overrides {
        if let Some(manager) = PackageManager::from_name(manager) {
            packages = packages.with_override(manager, names.iter().cloned());
        }
    }

    Ok(Target {
        name: name.to_string(),
        description: tool
            .description
            .clone()
            .unwrap_or_else(|| format!("{} (from config)", command)),
        requirement,
        method: InstallMethod::Packages(packages),
        prerequisites: Vec::new(),
        env: tool.env.as_ref().map(env_block),
    })
}

fn env_block(env: &crate::config::schema::EnvConfig) -> EnvBlock {
    env.exports
        .iter()
        .fold(EnvBlock::new(env.marker.clone()), |block, export| {
            block.export(export.key.clone(), export.value.clone())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::path::Path;

    fn parse(yaml: &str) -> StrapConfig {
        parse_config(yaml, Path::new("config.yml")).unwrap()
    }

    const PROTOC: &str = r#"
tools:
  protoc:
    version_pattern: 'libprotoc (\d+)\.'
    min_major: 3
    search_paths: [/opt/protoc/bin]
    packages: [protobuf-compiler]
    package_overrides:
      pacman: [protobuf]
    env:
      marker: llamastrap protoc
      exports:
        - { key: PROTOC, value: /usr/bin/protoc }
"#;

    #[test]
    fn valid_tool_becomes_package_target() {
        let targets = config_targets(&parse(PROTOC)).unwrap();
        let target = &targets[0];

        assert_eq!(target.name, "protoc");
        assert_eq!(target.requirement.name(), "protoc");
        assert_eq!(target.requirement.min_major(), 3);
        assert_eq!(target.env.as_ref().unwrap().marker(), "llamastrap protoc");
        let InstallMethod::Packages(spec) = &target.method else {
            panic!("config tools install from packages");
        };
        assert_eq!(spec.packages_for(PackageManager::Pacman), ["protobuf"]);
        assert_eq!(spec.packages_for(PackageManager::Apt), ["protobuf-compiler"]);
    }

    #[test]
    fn collects_every_problem() {
        let config = parse(
            r#"
tools:
  cuda:
    version_pattern: '(\d+)\.(\d+)'
    min_major: 0
    packages: []
    package_overrides:
      apk: [x]
"#,
        );

        let errors = validate_config(&config);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_deref()).collect();

        assert_eq!(
            fields,
            vec![
                None,
                Some("version_pattern"),
                Some("min_major"),
                Some("packages"),
                Some("package_overrides"),
            ]
        );
    }

    #[test]
    fn invalid_config_is_a_validation_error_naming_the_tool() {
        let config = parse("tools:\n  jq:\n    version_pattern: 'jq'\n    min_major: 1\n    packages: [jq]\n");
        let err = config_targets(&config).unwrap_err();

        assert!(matches!(err, StrapError::ConfigValidationError { .. }));
        assert!(err.to_string().contains("tools.jq.version_pattern"));
    }

    #[test]
    fn bad_env_key_is_reported() {
        let config = parse(
            "tools:\n  jq:\n    version_pattern: 'jq-(\\d+)'\n    min_major: 1\n    packages: [jq]\n    env:\n      marker: m\n      exports:\n        - { key: 'BAD-KEY', value: x }\n",
        );
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "tools.jq.env: 'BAD-KEY' is not a valid variable name");
    }

    #[test]
    fn command_defaults_to_tool_name_and_description_mentions_config() {
        let config = parse("tools:\n  jq:\n    version_pattern: 'jq-(\\d+)'\n    min_major: 1\n    packages: [jq]\n");
        let targets = config_targets(&config).unwrap();
        assert_eq!(targets[0].requirement.name(), "jq");
        assert_eq!(targets[0].description, "jq (from config)");
    }

    #[test]
    fn duplicate_markers_are_reported() {
        let config = parse(
            r#"
tools:
  jq:
    version_pattern: 'jq-(\d+)'
    min_major: 1
    packages: [jq]
    env:
      marker: llamastrap cuda
      exports:
        - { key: JQ, value: /usr/bin/jq }
  yq:
    version_pattern: 'yq (\d+)'
    min_major: 4
    packages: [yq]
    env:
      marker: llamastrap tools
      exports:
        - { key: YQ, value: /usr/bin/yq }
  zq:
    version_pattern: 'zq (\d+)'
    min_major: 1
    packages: [zq]
    env:
      marker: llamastrap tools
      exports:
        - { key: ZQ, value: /usr/bin/zq }
"#,
        );

        let errors: Vec<_> = validate_config(&config).iter().map(ToString::to_string).collect();

        assert_eq!(
            errors,
            vec![
                "tools.jq.env: marker 'llamastrap cuda' is already used by 'cuda'",
                "tools.zq.env: marker 'llamastrap tools' is already used by 'yq'",
            ]
        );
        assert!(config_targets(&config).is_err());
    }
}
