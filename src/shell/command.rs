//! External command execution.
//!
//! Every external tool call (package manager, git, cmake, version queries)
//! is a synchronous subprocess invocation described by an [`Invocation`]
//! and answered with a [`CommandResult`]. Programs are spawned directly,
//! never through a shell, so arguments reach them verbatim.

use crate::error::{Result, StrapError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output (empty when not captured).
    pub stdout: String,

    /// Standard error (empty when not captured).
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// The captured output a version query should be read from.
    ///
    /// Some tools print their version on stderr, so stderr is used when
    /// stdout is empty.
    pub fn version_output(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,

    /// Arguments, passed verbatim.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Capture stdout/stderr (if false, inherits from parent).
    pub capture: bool,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            capture: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in the given directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Capture output instead of inheriting the parent's stdio.
    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    /// File name of the program, used for matching and display.
    pub fn program_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }

    /// Human-readable command line.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Runs external commands and resolves executables.
///
/// The bootstrapper only talks to the outside world through this trait,
/// so tests can substitute a [`ScriptedRunner`](super::ScriptedRunner).
pub trait CommandRunner {
    /// Execute an invocation.
    ///
    /// A non-zero exit is reported through [`CommandResult::success`],
    /// not as an error. Failing to spawn is an error.
    fn run(&self, invocation: &Invocation) -> Result<CommandResult>;

    /// Resolve an executable by name in `extra_dirs`, then on PATH.
    ///
    /// A name with a directory component is checked as given.
    fn resolve(&self, program: &str, extra_dirs: &[PathBuf]) -> Option<PathBuf>;

    /// Execute an invocation, turning a non-zero exit into
    /// [`StrapError::ExternalCommandFailed`].
    fn run_checked(&self, invocation: &Invocation) -> Result<CommandResult> {
        let result = self.run(invocation)?;
        if result.success {
            Ok(result)
        } else {
            Err(StrapError::ExternalCommandFailed {
                command: invocation.display(),
                code: result.exit_code,
            })
        }
    }
}

/// [`CommandRunner`] backed by real processes and the real PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a system runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        let start = Instant::now();
        tracing::debug!("Running: {}", invocation.display());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);

        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        let output = if invocation.capture {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
        } else {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map(|status| std::process::Output {
                    status,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                })
        };

        let output = output.map_err(|e| {
            tracing::debug!("Failed to spawn {}: {}", invocation.program, e);
            StrapError::ExternalCommandFailed {
                command: invocation.display(),
                code: None,
            }
        })?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        tracing::debug!(
            "{} exited with {:?} after {:?}",
            invocation.program_name(),
            output.status.code(),
            duration
        );

        if output.status.success() {
            Ok(CommandResult::success(stdout, stderr, duration))
        } else {
            Ok(CommandResult::failure(
                output.status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }

    fn resolve(&self, program: &str, extra_dirs: &[PathBuf]) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return (candidate.is_file() && is_executable(candidate))
                .then(|| candidate.to_path_buf());
        }

        resolve_tool_path(program, &search_path(extra_dirs))
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over directories.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command, whose behavior varies across systems.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Directories searched for a tool: `extra_dirs` first, so a tool's own
/// install location wins over an older copy on PATH.
pub fn search_path(extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = extra_dirs.to_vec();
    dirs.extend(parse_system_path());
    dirs
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}
