//! Env command implementation.
//!
//! The `llamastrap env` command appends the environment blocks of installed
//! targets to the profile. Blocks already present are left alone, so it is
//! safe to run repeatedly.

use crate::bootstrap::Bootstrapper;
use crate::cli::args::EnvArgs;
use crate::error::Result;
use crate::profile::{EnvWriter, WriteOutcome};
use crate::requirements::{Detector, Privilege};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The env command implementation.
pub struct EnvCommand<'a> {
    context: CommandContext<'a>,
    args: EnvArgs,
}

impl<'a> EnvCommand<'a> {
    /// Create a new env command.
    pub fn new(context: CommandContext<'a>, args: EnvArgs) -> Self {
        Self { context, args }
    }
}

impl Command for EnvCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let targets = self.context.catalog.select(&self.args.targets)?;
        let detector = Detector::new(self.context.runner);
        // Nothing is installed here, so privilege is irrelevant.
        let bootstrapper = Bootstrapper::new(
            self.context.runner,
            Privilege::User,
            EnvWriter::new(&self.context.profile_file),
        );

        let mut appended = 0;
        for target in targets {
            let Some(block) = &target.env else {
                tracing::debug!("{} has no environment block", target.name);
                continue;
            };

            if !detector.detect(&target.requirement).is_present() {
                ui.warning(&format!(
                    "Skipping {}: '{}' is not installed",
                    target.name,
                    target.requirement.name()
                ));
                continue;
            }

            if bootstrapper.write_env(block, ui)? == WriteOutcome::Appended {
                appended += 1;
            }
        }

        if appended > 0 {
            ui.show_hint(&format!(
                "Open a new shell or run 'source {}' to pick up the new exports.",
                self.context.profile_file.display()
            ));
        }

        Ok(CommandResult::success())
    }
}
