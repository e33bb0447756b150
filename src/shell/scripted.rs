//! Scripted command runner for testing.
//!
//! `ScriptedRunner` implements [`CommandRunner`] without touching the
//! system. Tools are made resolvable explicitly, command results are
//! queued per program, and every invocation is recorded for assertion.
//!
//! # Example
//!
//! ```
//! use llamastrap::shell::{CommandRunner, Invocation, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new()
//!     .with_tool("apt-get", "/usr/bin/apt-get")
//!     .installs("apt-get", "nvcc", "/usr/bin/nvcc");
//!
//! assert!(runner.resolve("nvcc", &[]).is_none());
//! runner.run(&Invocation::new("apt-get").args(["install", "-y", "nvidia-cuda-toolkit"])).unwrap();
//! assert!(runner.resolve("nvcc", &[]).is_some());
//! assert_eq!(runner.invocations().len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

use super::command::{CommandResult, CommandRunner, Invocation};

/// A [`CommandRunner`] driven entirely by pre-configured answers.
///
/// Programs without queued results succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    tools: RefCell<BTreeMap<String, PathBuf>>,
    results: RefCell<HashMap<String, VecDeque<CommandResult>>>,
    provides: HashMap<String, Vec<(String, PathBuf)>>,
    invocations: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    /// Create a runner where nothing is installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `tool` resolvable at `path`.
    pub fn with_tool(self, tool: &str, path: impl Into<PathBuf>) -> Self {
        self.tools.borrow_mut().insert(tool.to_string(), path.into());
        self
    }

    /// Queue a successful result with the given stdout for `program`.
    pub fn with_output(self, program: &str, stdout: &str) -> Self {
        self.push_result(
            program,
            CommandResult::success(stdout.to_string(), String::new(), Duration::ZERO),
        );
        self
    }

    /// Queue a failing result with the given exit code for `program`.
    pub fn with_failure(self, program: &str, exit_code: i32) -> Self {
        self.push_result(
            program,
            CommandResult::failure(Some(exit_code), String::new(), String::new(), Duration::ZERO),
        );
        self
    }

    /// After a successful invocation mentioning `program`, make `tool`
    /// resolvable at `path`.
    pub fn installs(mut self, program: &str, tool: &str, path: impl Into<PathBuf>) -> Self {
        self.provides
            .entry(program.to_string())
            .or_default()
            .push((tool.to_string(), path.into()));
        self
    }

    /// Queue a result for `program`.
    pub fn push_result(&self, program: &str, result: CommandResult) {
        self.results
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .push_back(result);
    }

    /// All invocations seen so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Command lines of all invocations seen so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(Invocation::display)
            .collect()
    }

    /// Whether any invocation ran `program` (by file name).
    pub fn ran(&self, program: &str) -> bool {
        self.invocations
            .borrow()
            .iter()
            .any(|inv| inv.program_name() == program)
    }

    fn mentions(invocation: &Invocation, program: &str) -> bool {
        invocation.program_name() == program || invocation.args.iter().any(|a| a == program)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        self.invocations.borrow_mut().push(invocation.clone());

        let result = self
            .results
            .borrow_mut()
            .get_mut(invocation.program_name())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| CommandResult::success(String::new(), String::new(), Duration::ZERO));

        if result.success {
            for (program, provided) in &self.provides {
                if Self::mentions(invocation, program) {
                    let mut tools = self.tools.borrow_mut();
                    for (tool, path) in provided {
                        tools.insert(tool.clone(), path.clone());
                    }
                }
            }
        }

        Ok(result)
    }

    fn resolve(&self, program: &str, _extra_dirs: &[PathBuf]) -> Option<PathBuf> {
        self.tools.borrow().get(program).cloned()
    }
}
