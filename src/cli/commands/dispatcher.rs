//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the state target-aware commands share
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::bootstrap::TargetCatalog;
use crate::cli::args::{BuildSettings, Cli, Commands};
use crate::config::{config_targets, load_config};
use crate::error::Result;
use crate::shell::{default_profile_file, expand_home, CommandRunner};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Targets, profile file and process runner for one invocation.
pub struct CommandContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub catalog: TargetCatalog,
    pub profile_file: PathBuf,
}

impl<'a> CommandContext<'a> {
    /// Load the config file and build the catalog.
    ///
    /// The profile file comes from `profile_flag`, then the config's
    /// `profile_file`, then the shell default.
    pub fn load(
        runner: &'a dyn CommandRunner,
        settings: &BuildSettings,
        config_path: Option<&Path>,
        profile_flag: Option<&str>,
    ) -> Result<Self> {
        let config = load_config(config_path)?;

        let mut catalog = TargetCatalog::builtin(&settings.cuda(), &settings.llama())?;
        for target in config_targets(&config)? {
            catalog.add(target)?;
        }

        let profile_file = profile_flag
            .or(config.profile_file.as_deref())
            .map(expand_home)
            .unwrap_or_else(default_profile_file);
        tracing::debug!("Profile file: {}", profile_file.display());

        Ok(Self {
            runner,
            catalog,
            profile_file,
        })
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    runner: Box<dyn CommandRunner>,
}

impl CommandDispatcher {
    /// Create a dispatcher that runs external tools through `runner`.
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. Commands that don't touch targets skip loading the
    /// config file.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let runner = self.runner.as_ref();
        let context = || {
            CommandContext::load(
                runner,
                &cli.settings,
                cli.config.as_deref(),
                cli.profile_file.as_deref(),
            )
        };

        match &cli.command {
            Commands::Install(args) => {
                let cmd = super::install::InstallCommand::new(context()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Check(args) => {
                let cmd = super::check::CheckCommand::new(context()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Env(args) => {
                let cmd = super::env::EnvCommand::new(context()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Targets => {
                let cmd = super::targets::TargetsCommand::new(context()?);
                cmd.execute(ui)
            }
            Commands::Serve(args) => {
                let cmd = super::serve::ServeCommand::new(
                    runner,
                    cli.settings.llama().bin_dir(),
                    args.clone(),
                );
                cmd.execute(ui)
            }
            Commands::Demo(args) => {
                let cmd = super::demo::DemoCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Agent(args) => {
                let cmd = super::agent::AgentCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}
