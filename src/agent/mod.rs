//! A file-editing agent driven by the local server.
//!
//! The model is told to answer with a bare JSON tool call whenever it wants
//! to look at or change the [`Workspace`]. Each call is executed and its
//! result sent back as a `TOOL_RESULT:` user message. The first reply that
//! is not a tool call is the final answer. Runs stop with
//! [`StrapError::AgentTurnLimit`] if the model is still calling tools after
//! the turn limit.

pub mod tools;
pub mod workspace;

pub use tools::{ToolCall, ToolResult, TOOL_RESULT_PREFIX};
pub use workspace::Workspace;

use std::path::Path;

use crate::error::{Result, StrapError};
use crate::server::{ChatClient, ChatMessage};
use crate::ui::{OutputMode, UserInterface};

/// Model replies allowed per run.
pub const DEFAULT_MAX_TURNS: usize = 25;

/// Task used when none is given.
pub const DEFAULT_TASK: &str =
    "Create a file named hello.txt in the workspace containing the text 'hello world'.";

/// System prompt explaining the tool protocol.
pub fn system_prompt(root: &Path) -> String {
    format!(
        r#"You are a coding agent working inside a local workspace directory: {root}

You cannot run commands. To inspect or change files, reply with ONLY one JSON object and no other text:

  {{"tool": "list_dir", "path": "relative/dir"}}
  {{"tool": "read_file", "path": "relative/file"}}
  {{"tool": "write_file", "path": "relative/file", "content": "..."}}

Paths are relative to the workspace root. Never use absolute paths or "..".

Each tool call is answered with a message of the form
  TOOL_RESULT: <json>
where <json> is {{"status":"ok","result":...}} or {{"status":"error","message":"..."}}.

Call as many tools as you need, one per reply. When the task is done, reply in plain prose describing what you did."#,
        root = root.display()
    )
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReport {
    /// The model's final prose answer.
    pub answer: String,
    /// Model replies received, including the final one.
    pub turns: usize,
    pub tool_calls: usize,
    /// Tool calls that returned an error result.
    pub failed_calls: usize,
}

/// One conversation between the model and a workspace.
pub struct Agent<'a> {
    client: &'a ChatClient,
    model: String,
    workspace: Workspace,
    max_turns: usize,
    messages: Vec<ChatMessage>,
}

impl<'a> Agent<'a> {
    /// Start a conversation about `task`.
    pub fn new(
        client: &'a ChatClient,
        model: impl Into<String>,
        workspace: Workspace,
        task: &str,
    ) -> Self {
        let messages = vec![
            ChatMessage::system(system_prompt(workspace.root())),
            ChatMessage::user(task),
        ];
        Self {
            client,
            model: model.into(),
            workspace,
            max_turns: DEFAULT_MAX_TURNS,
            messages,
        }
    }

    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// The conversation so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Run until the model answers in prose or the turn limit is hit.
    pub fn run(&mut self, ui: &mut dyn UserInterface) -> Result<AgentReport> {
        let mut tool_calls = 0;
        let mut failed_calls = 0;

        for turn in 1..=self.max_turns {
            let reply = self.ask(turn, ui)?;
            tracing::debug!("Reply on turn {}: {}", turn, reply);
            if ui.output_mode() == OutputMode::Verbose {
                ui.message(&format!("Model: {}", reply.trim()));
            }

            let Some(call) = ToolCall::parse(&reply) else {
                return Ok(AgentReport {
                    answer: reply.trim().to_string(),
                    turns: turn,
                    tool_calls,
                    failed_calls,
                });
            };

            ui.message(&format!("Tool call: {}", call.describe()));
            let result = self.workspace.execute(&call);
            tool_calls += 1;
            if let ToolResult::Error { message } = &result {
                failed_calls += 1;
                ui.warning(&format!("{} failed: {}", call.name(), message));
            }

            self.messages.push(ChatMessage::assistant(reply));
            self.messages.push(ChatMessage::user(result.feedback()));
        }

        Err(StrapError::AgentTurnLimit {
            turns: self.max_turns,
        })
    }

    fn ask(&self, turn: usize, ui: &mut dyn UserInterface) -> Result<String> {
        let mut spinner = ui.start_spinner(&format!("Waiting for {} (turn {})", self.model, turn));
        match self.client.reply(&self.model, &self.messages) {
            Ok(reply) => {
                spinner.finish_success(&format!("Turn {} answered", turn));
                Ok(reply)
            }
            Err(e) => {
                spinner.finish_error("Request failed");
                Err(e)
            }
        }
    }
}
