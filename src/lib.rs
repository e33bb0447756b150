//! llamastrap - Idempotent bootstrapper for a local LLM inference environment.
//!
//! llamastrap detects, installs and verifies the CUDA toolkit and a
//! from-source build of llama.cpp, appends their environment exports to the
//! user's shell profile exactly once, and can then serve a model and send
//! it a tool-calling chat request.
//!
//! # Modules
//!
//! - [`agent`] - Workspace file-editing agent on top of the served model
//! - [`bootstrap`] - Targets and the detect/install/verify/write-env state machine
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Optional YAML config with user-defined targets
//! - [`detection`] - OS identification and system package manager detection
//! - [`error`] - Error types and result aliases
//! - [`profile`] - Marker-delimited environment blocks in shell profiles
//! - [`requirements`] - Tool detection, version checking and installation
//! - [`server`] - Launching `llama-server` and the demo request
//! - [`shell`] - External process execution
//! - [`source`] - Git checkout and CMake build of llama.cpp
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use llamastrap::profile::EnvBlock;
//!
//! let block = EnvBlock::new("llamastrap cuda").export("CUDA_HOME", "/usr/local/cuda");
//! assert!(block.render().starts_with("# >>> llamastrap cuda >>>\n"));
//! assert!(block.is_present_in(&block.render()));
//! ```

pub mod agent;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod profile;
pub mod requirements;
pub mod server;
pub mod shell;
pub mod source;
pub mod ui;

pub use error::{Result, StrapError};
