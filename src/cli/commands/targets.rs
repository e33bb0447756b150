//! Targets command implementation.
//!
//! The `llamastrap targets` command lists built-in and config-defined
//! targets.

use crate::bootstrap::Target;
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The targets command implementation.
pub struct TargetsCommand<'a> {
    context: CommandContext<'a>,
}

impl<'a> TargetsCommand<'a> {
    /// Create a new targets command.
    pub fn new(context: CommandContext<'a>) -> Self {
        Self { context }
    }
}

/// Render targets as a table.
pub fn targets_table(targets: &[Target]) -> Table {
    let mut table = Table::new(["NAME", "TOOL", "MIN", "DESCRIPTION"]);
    for target in targets {
        table.add_row([
            target.name.clone(),
            target.requirement.name().to_string(),
            target.requirement.min_major().to_string(),
            target.description.clone(),
        ]);
    }
    table
}

impl Command for TargetsCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message(&targets_table(self.context.catalog.all()).render());
        Ok(CommandResult::success())
    }
}
