//! Demo command implementation.
//!
//! The `llamastrap demo` command sends one tool-calling chat request to a
//! running server and prints what the model chose to do.

use std::time::Duration;

use crate::cli::args::DemoArgs;
use crate::error::Result;
use crate::server::{demo_payload, ChatClient, DemoOutcome};
use crate::ui::{OutputMode, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The demo command implementation.
pub struct DemoCommand {
    args: DemoArgs,
}

impl DemoCommand {
    /// Create a new demo command.
    pub fn new(args: DemoArgs) -> Self {
        Self { args }
    }
}

impl Command for DemoCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let client =
            ChatClient::new(&self.args.server_url, Duration::from_secs(self.args.timeout))?;
        ui.message(&format!("User: {}", self.args.prompt));
        if ui.output_mode() == OutputMode::Verbose {
            ui.message(&format!(
                "Request body: {}",
                demo_payload(&self.args.model, &self.args.prompt)
            ));
        }

        let mut spinner = ui.start_spinner(&format!(
            "Asking {} at {}",
            self.args.model,
            client.endpoint()
        ));
        let outcome = match client.run_demo(&self.args.model, &self.args.prompt) {
            Ok(outcome) => {
                spinner.finish_success("Response received");
                outcome
            }
            Err(e) => {
                spinner.finish_error("Request failed");
                return Err(e);
            }
        };

        match outcome {
            DemoOutcome::ToolCall { name, arguments } => {
                ui.success(&format!("Tool call: {}", name));
                let pretty = serde_json::to_string_pretty(&arguments)
                    .unwrap_or_else(|_| arguments.to_string());
                ui.message(&format!("Arguments: {}", pretty));
            }
            DemoOutcome::Answer(text) => {
                ui.warning("The model answered without calling a tool");
                ui.message(&format!("Assistant: {}", text));
            }
        }

        Ok(CommandResult::success())
    }
}
