//! Check command implementation.
//!
//! The `llamastrap check` command reports whether each target's tool is
//! installed, without installing anything.

use serde::Serialize;

use crate::bootstrap::Target;
use crate::cli::args::CheckArgs;
use crate::error::{Result, StrapError};
use crate::requirements::{Detection, Detector, ToolVersion};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// One row of the check report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckEntry {
    pub target: String,
    pub tool: String,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CheckEntry {
    fn from_detection(target: &Target, detection: Detection) -> Self {
        let tool = target.requirement.name().to_string();
        match detection {
            Detection::Absent => Self {
                target: target.name.clone(),
                tool,
                installed: false,
                major_version: None,
                path: None,
                warning: None,
            },
            Detection::Present { path, check } => Self {
                target: target.name.clone(),
                major_version: match check.version() {
                    ToolVersion::Major(m) => Some(m),
                    ToolVersion::Unknown => None,
                },
                warning: check.warning(&tool),
                path: Some(path.display().to_string()),
                installed: true,
                tool,
            },
        }
    }

    fn status(&self) -> String {
        match (self.installed, self.major_version) {
            (false, _) => "missing".to_string(),
            (true, Some(major)) => format!("major {}", major),
            (true, None) => "unknown version".to_string(),
        }
    }
}

/// The check command implementation.
pub struct CheckCommand<'a> {
    context: CommandContext<'a>,
    args: CheckArgs,
}

impl<'a> CheckCommand<'a> {
    /// Create a new check command.
    pub fn new(context: CommandContext<'a>, args: CheckArgs) -> Self {
        Self { context, args }
    }

    /// Detect every selected target.
    pub fn entries(&self) -> Result<Vec<CheckEntry>> {
        let detector = Detector::new(self.context.runner);
        Ok(self
            .context
            .catalog
            .select(&self.args.targets)?
            .into_iter()
            .map(|target| CheckEntry::from_detection(target, detector.detect(&target.requirement)))
            .collect())
    }
}

impl Command for CheckCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let entries = self.entries()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| StrapError::Other(e.into()))?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(["TARGET", "TOOL", "STATUS", "PATH"]);
        for entry in &entries {
            table.add_row([
                entry.target.clone(),
                entry.tool.clone(),
                entry.status(),
                entry.path.clone().unwrap_or_default(),
            ]);
        }
        ui.message(&table.render());

        for warning in entries.iter().filter_map(|e| e.warning.as_deref()) {
            ui.warning(warning);
        }

        let missing: Vec<_> = entries
            .iter()
            .filter(|e| !e.installed)
            .map(|e| e.target.as_str())
            .collect();
        if !missing.is_empty() {
            ui.show_hint(&format!("Run 'llamastrap install {}'.", missing.join(" ")));
        }

        Ok(CommandResult::success())
    }
}
