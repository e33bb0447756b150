//! Install command implementation.
//!
//! The `llamastrap install` command bootstraps targets in the order given.
//! The first failure aborts the whole command.

use crate::bootstrap::{reported_version, Bootstrapper};
use crate::cli::args::InstallArgs;
use crate::error::Result;
use crate::profile::EnvWriter;
use crate::requirements::{InstallResult, Privilege};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The install command implementation.
pub struct InstallCommand<'a> {
    context: CommandContext<'a>,
    args: InstallArgs,
}

impl<'a> InstallCommand<'a> {
    /// Create a new install command.
    pub fn new(context: CommandContext<'a>, args: InstallArgs) -> Self {
        Self { context, args }
    }
}

impl Command for InstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let targets = self.context.catalog.select(&self.args.targets)?;
        let privilege = Privilege::detect(self.context.runner);
        tracing::debug!("Install privilege: {:?}", privilege);

        let bootstrapper = Bootstrapper::new(
            self.context.runner,
            privilege,
            EnvWriter::new(&self.context.profile_file),
        )
        .assume_yes(self.args.yes);

        let mut wrote_env = false;
        for target in targets {
            ui.show_header(&format!("{} - {}", target.name, target.description));

            let run = bootstrapper.run(target, ui);
            let version = reported_version(&run.result).copied();
            match run.result {
                InstallResult::Failed(e) => return Err(e),
                InstallResult::Skipped(_) => {
                    ui.message(&format!("{}: already installed", target.name));
                }
                InstallResult::Installed(_) => {
                    wrote_env |= target.env.is_some();
                }
            }
            if let Some(version) = version {
                tracing::info!("{} ready ({})", target.name, version);
            }
        }

        if wrote_env {
            ui.show_hint(&format!(
                "Open a new shell or run 'source {}' to pick up the new exports.",
                self.context.profile_file.display()
            ));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{CudaSettings, LlamaSettings, TargetCatalog};
    use crate::error::StrapError;
    use crate::shell::ScriptedRunner;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn context<'a>(runner: &'a ScriptedRunner, temp: &TempDir) -> CommandContext<'a> {
        CommandContext {
            runner,
            catalog: TargetCatalog::builtin(
                &CudaSettings::default(),
                &LlamaSettings::at(temp.path().join("llama.cpp")),
            )
            .unwrap(),
            profile_file: temp.path().join(".bashrc"),
        }
    }

    fn args(targets: &[&str]) -> InstallArgs {
        InstallArgs {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            yes: true,
        }
    }

    #[test]
    fn present_cuda_is_skipped_without_touching_profile() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .with_tool("nvcc", "/usr/local/cuda/bin/nvcc")
            .with_output("nvcc", "Cuda compilation tools, release 12.1, V12.1.105");
        let mut ui = MockUI::new();

        let result = InstallCommand::new(context(&runner, &temp), args(&["cuda"]))
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("cuda: already installed"));
        assert!(!temp.path().join(".bashrc").exists());
        assert!(ui.hints().is_empty());
    }

    #[test]
    fn fresh_install_appends_exports_and_hints_to_reload() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .with_tool("apt-get", "/usr/bin/apt-get")
            .installs("apt-get", "nvcc", "/usr/local/cuda/bin/nvcc")
            .with_output("nvcc", "Cuda compilation tools, release 12.1, V12.1.105");
        let mut ui = MockUI::new();

        InstallCommand::new(context(&runner, &temp), args(&["cuda"]))
            .execute(&mut ui)
            .unwrap();

        let profile = fs::read_to_string(temp.path().join(".bashrc")).unwrap();
        assert!(profile.contains("# >>> llamastrap cuda >>>"));
        assert!(ui.has_hint("source"));
    }

    #[test]
    fn unknown_target_fails_before_running_anything() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut ui = MockUI::new();

        let err = InstallCommand::new(context(&runner, &temp), args(&["cuda", "rocm"]))
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, StrapError::UnknownTarget { .. }));
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn failure_aborts_remaining_targets() {
        let temp = TempDir::new().unwrap();
        // No package manager: cuda cannot be installed.
        let runner = ScriptedRunner::new();
        let mut ui = MockUI::new();

        let err = InstallCommand::new(context(&runner, &temp), args(&["cuda", "llama-cpp"]))
            .execute(&mut ui)
            .unwrap_err();

        assert!(matches!(err, StrapError::PlatformUnsupported { .. }));
        assert!(!ui.headers().iter().any(|h| h.starts_with("llama-cpp")));
    }
}
