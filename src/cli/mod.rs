//! Command-line interface for llamastrap.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    AgentArgs, BuildSettings, CheckArgs, Cli, Commands, CompletionsArgs, DemoArgs, EnvArgs,
    InstallArgs, ServeArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
