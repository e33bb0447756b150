//! Configuration loading and validation.
//!
//! The config file is optional YAML. It can name the profile file and
//! define extra package-installed tools, which become targets next to the
//! built-in `cuda` and `llama-cpp`.

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{default_config_path, load_config, load_config_file, parse_config};
pub use schema::{EnvConfig, ExportConfig, StrapConfig, ToolConfig};
pub use validator::{config_targets, validate_config, ValidationError};
