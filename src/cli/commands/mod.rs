//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that work on targets
//! share a [`CommandContext`] built from the flags and the config file.

pub mod agent;
pub mod check;
pub mod completions;
pub mod demo;
pub mod dispatcher;
pub mod env;
pub mod install;
pub mod serve;
pub mod targets;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
