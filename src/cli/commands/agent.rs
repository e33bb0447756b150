//! Agent command implementation.
//!
//! The `llamastrap agent` command lets the served model work on files in a
//! workspace directory until it reports that the task is done.

use std::time::Duration;

use crate::agent::{Agent, Workspace};
use crate::cli::args::AgentArgs;
use crate::error::Result;
use crate::server::ChatClient;
use crate::shell::expand_home;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The agent command implementation.
pub struct AgentCommand {
    args: AgentArgs,
}

impl AgentCommand {
    /// Create a new agent command.
    pub fn new(args: AgentArgs) -> Self {
        Self { args }
    }
}

impl Command for AgentCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let workspace = Workspace::open(expand_home(&self.args.workspace))?;
        let client =
            ChatClient::new(&self.args.server_url, Duration::from_secs(self.args.timeout))?;

        ui.show_header(&format!("Agent workspace: {}", workspace.root().display()));
        ui.message(&format!("Task: {}", self.args.task));

        let report = Agent::new(&client, &self.args.model, workspace, &self.args.task)
            .max_turns(self.args.max_turns)
            .run(ui)?;

        ui.success(&format!(
            "Finished after {} turns ({} tool calls, {} failed)",
            report.turns, report.tool_calls, report.failed_calls
        ));
        ui.message(&format!("Assistant: {}", report.answer));

        Ok(CommandResult::success())
    }
}
