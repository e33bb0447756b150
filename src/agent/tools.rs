//! Tool calls the agent understands and the results sent back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::server::extract_json_from_markdown;

/// Prefix of the user message that carries a tool result back to the model.
pub const TOOL_RESULT_PREFIX: &str = "TOOL_RESULT: ";

/// A tool call, written by the model as a bare JSON object.
///
/// ```
/// use llamastrap::agent::ToolCall;
///
/// let call = ToolCall::parse(r#"{"tool": "read_file", "path": "src/main.rs"}"#);
/// assert_eq!(
///     call,
///     Some(ToolCall::ReadFile { path: "src/main.rs".to_string() })
/// );
/// assert_eq!(ToolCall::parse("All done."), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    ListDir {
        #[serde(default)]
        path: String,
    },
    ReadFile {
        path: String,
    },
    WriteFile {
        path: String,
        content: String,
    },
}

impl ToolCall {
    /// Recognize a tool call in a reply, bare or inside a Markdown fence.
    pub fn parse(reply: &str) -> Option<Self> {
        serde_json::from_str(extract_json_from_markdown(reply)).ok()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ListDir { .. } => "list_dir",
            ToolCall::ReadFile { .. } => "read_file",
            ToolCall::WriteFile { .. } => "write_file",
        }
    }

    /// Workspace-relative path the call operates on.
    pub fn path(&self) -> &str {
        match self {
            ToolCall::ListDir { path }
            | ToolCall::ReadFile { path }
            | ToolCall::WriteFile { path, .. } => path,
        }
    }

    /// One-line summary for progress output.
    pub fn describe(&self) -> String {
        let path = if self.path().is_empty() { "." } else { self.path() };
        match self {
            ToolCall::WriteFile { content, .. } => {
                format!("{} {} ({} bytes)", self.name(), path, content.len())
            }
            _ => format!("{} {}", self.name(), path),
        }
    }
}

/// Outcome of a tool call, serialized as `{"status": "ok", "result": ...}`
/// or `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult {
    Ok { result: Value },
    Error { message: String },
}

impl ToolResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ToolResult::Ok { .. })
    }

    /// The user message reporting this result to the model.
    pub fn feedback(&self) -> String {
        format!(
            "{}{}",
            TOOL_RESULT_PREFIX,
            serde_json::to_string(self).unwrap_or_default()
        )
    }
}
