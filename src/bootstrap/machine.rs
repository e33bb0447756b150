//! The detect, install, verify, write-env state machine.

use std::fmt;

use crate::error::{Result, StrapError};
use crate::profile::{EnvBlock, EnvWriter, WriteOutcome};
use crate::requirements::{
    Detection, Detector, InstallMethod, InstallResult, Installer, Privilege, ToolRequirement,
    ToolVersion,
};
use crate::shell::CommandRunner;
use crate::ui::{Prompt, UserInterface};

/// A state in one bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Start,
    Detect,
    Install,
    Verify,
    WriteEnv,
    Done,
    Fail,
}

impl BootstrapState {
    /// Whether the run ends in this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootstrapState::Done | BootstrapState::Fail)
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapState::Start => "start",
            BootstrapState::Detect => "detect",
            BootstrapState::Install => "install",
            BootstrapState::Verify => "verify",
            BootstrapState::WriteEnv => "write-env",
            BootstrapState::Done => "done",
            BootstrapState::Fail => "fail",
        };
        f.write_str(name)
    }
}

/// Something that can be bootstrapped.
#[derive(Debug, Clone)]
pub struct Target {
    /// Name used on the command line.
    pub name: String,
    /// One-line description for listings.
    pub description: String,
    /// What counts as installed.
    pub requirement: ToolRequirement,
    /// How to install it when absent.
    pub method: InstallMethod,
    /// Tools bootstrapped (without env writing) before installing this one.
    pub prerequisites: Vec<Target>,
    /// Exports appended to the profile after a fresh install.
    pub env: Option<EnvBlock>,
}

/// The outcome of bootstrapping one target.
#[derive(Debug)]
pub struct BootstrapRun {
    pub target: String,
    pub result: InstallResult,
    /// Every state entered, in order, ending in a terminal state.
    pub transitions: Vec<BootstrapState>,
}

impl BootstrapRun {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// The terminal state.
    pub fn final_state(&self) -> Option<BootstrapState> {
        self.transitions.last().copied()
    }
}

/// Runs targets through the state machine.
///
/// Present tools go straight to `Done`. Absent tools are installed,
/// detected again and, if found, get their env block appended.
pub struct Bootstrapper<'a> {
    runner: &'a dyn CommandRunner,
    privilege: Privilege,
    writer: EnvWriter,
    assume_yes: bool,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(runner: &'a dyn CommandRunner, privilege: Privilege, writer: EnvWriter) -> Self {
        Self {
            runner,
            privilege,
            writer,
            assume_yes: false,
        }
    }

    /// Install without asking for confirmation.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn writer(&self) -> &EnvWriter {
        &self.writer
    }

    /// Bootstrap `target`. Errors end the run in `Fail`; nothing is retried.
    pub fn run(&self, target: &Target, ui: &mut dyn UserInterface) -> BootstrapRun {
        let mut transitions = Vec::new();
        let result = match self.drive(target, ui, &mut transitions) {
            Ok(result) => result,
            Err(e) => {
                enter(&mut transitions, target, BootstrapState::Fail);
                InstallResult::Failed(e)
            }
        };

        BootstrapRun {
            target: target.name.clone(),
            result,
            transitions,
        }
    }

    fn drive(
        &self,
        target: &Target,
        ui: &mut dyn UserInterface,
        transitions: &mut Vec<BootstrapState>,
    ) -> Result<InstallResult> {
        let tool = target.requirement.name();
        let detector = Detector::new(self.runner);

        enter(transitions, target, BootstrapState::Start);
        enter(transitions, target, BootstrapState::Detect);

        let mut spinner = ui.start_spinner(&format!("Checking {}", tool));
        let detection = detector.detect(&target.requirement);
        match &detection {
            Detection::Present { path, check } => {
                spinner.finish_success(&format!(
                    "{} found at {} ({})",
                    tool,
                    path.display(),
                    check.version()
                ));
                if let Some(warning) = check.warning(tool) {
                    ui.warning(&warning);
                }
                enter(transitions, target, BootstrapState::Done);
                return Ok(InstallResult::Skipped(check.version()));
            }
            Detection::Absent => {
                spinner.finish_error(&format!("{} not found", tool));
            }
        }

        enter(transitions, target, BootstrapState::Install);
        self.install(target, ui)?;

        enter(transitions, target, BootstrapState::Verify);
        let version = match detector.detect(&target.requirement) {
            Detection::Present { path, check } => {
                if let Some(warning) = check.warning(tool) {
                    ui.warning(&warning);
                }
                ui.success(&format!("Installed {} at {}", tool, path.display()));
                check.version()
            }
            Detection::Absent => {
                return Err(StrapError::ToolStillAbsent {
                    tool: tool.to_string(),
                });
            }
        };

        enter(transitions, target, BootstrapState::WriteEnv);
        if let Some(block) = &target.env {
            self.write_env(block, ui)?;
        }

        enter(transitions, target, BootstrapState::Done);
        Ok(InstallResult::Installed(version))
    }

    fn install(&self, target: &Target, ui: &mut dyn UserInterface) -> Result<()> {
        let tool = target.requirement.name();

        for prerequisite in &target.prerequisites {
            let run = self.run(prerequisite, ui);
            if let InstallResult::Failed(e) = run.result {
                tracing::debug!("Prerequisite {} failed for {}", prerequisite.name, target.name);
                return Err(e);
            }
        }

        if !self.assume_yes {
            let prompt = Prompt::new(
                format!("install_{}", prompt_key(tool)),
                format!("Install {} via {}?", tool, target.method.describe()),
                true,
            );
            if !ui.confirm(&prompt)? {
                return Err(StrapError::InstallDeclined {
                    tool: tool.to_string(),
                });
            }
        }

        ui.message(&format!("Installing {} via {}", tool, target.method.describe()));
        Installer::new(self.runner, self.privilege).install(tool, &target.method, ui)
    }

    /// Append `block` to the profile, reporting what happened.
    pub fn write_env(&self, block: &EnvBlock, ui: &mut dyn UserInterface) -> Result<WriteOutcome> {
        let outcome = self.writer.append(block)?;
        match outcome {
            WriteOutcome::Appended => ui.success(&format!(
                "Added '{}' exports to {}",
                block.marker(),
                self.writer.path().display()
            )),
            WriteOutcome::AlreadyPresent => ui.message(&format!(
                "'{}' exports already in {}",
                block.marker(),
                self.writer.path().display()
            )),
        }
        Ok(outcome)
    }
}

fn enter(transitions: &mut Vec<BootstrapState>, target: &Target, state: BootstrapState) {
    tracing::debug!("{}: {}", target.name, state);
    transitions.push(state);
}

/// Lowercase alphanumerics, everything else as `_`.
fn prompt_key(tool: &str) -> String {
    tool.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Reported version of a finished run, if it finished.
pub fn reported_version(result: &InstallResult) -> Option<&ToolVersion> {
    match result {
        InstallResult::Skipped(v) | InstallResult::Installed(v) => Some(v),
        InstallResult::Failed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::PackageSpec;
    use crate::shell::ScriptedRunner;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn nvcc_target() -> Target {
        Target {
            name: "cuda".to_string(),
            description: "CUDA toolkit".to_string(),
            requirement: ToolRequirement::new("nvcc", 8, r"release\s+(\d+)\.").unwrap(),
            method: InstallMethod::Packages(PackageSpec::new(["nvidia-cuda-toolkit"])),
            prerequisites: Vec::new(),
            env: Some(EnvBlock::new("llamastrap cuda").export("CUDA_HOME", "/usr/local/cuda")),
        }
    }

    fn apt_runner() -> ScriptedRunner {
        ScriptedRunner::new().with_tool("apt-get", "/usr/bin/apt-get")
    }

    #[test]
    fn present_tool_skips_install_and_env() {
        let temp = TempDir::new().unwrap();
        let profile = temp.path().join(".bashrc");
        let runner = ScriptedRunner::new()
            .with_tool("nvcc", "/usr/local/cuda/bin/nvcc")
            .with_output("nvcc", "Cuda compilation tools, release 12.1, V12.1.105");
        let mut ui = MockUI::new();

        let run = Bootstrapper::new(&runner, Privilege::Root, EnvWriter::new(&profile))
            .run(&nvcc_target(), &mut ui);

        assert!(matches!(
            run.result,
            InstallResult::Skipped(ToolVersion::Major(12))
        ));
        assert_eq!(
            run.transitions,
            vec![
                BootstrapState::Start,
                BootstrapState::Detect,
                BootstrapState::Done
            ]
        );
        assert!(!profile.exists());
    }

    #[test]
    fn absent_tool_is_installed_verified_and_exported() {
        let temp = TempDir::new().unwrap();
        let profile = temp.path().join(".bashrc");
        let runner = apt_runner()
            .installs("apt-get", "nvcc", "/usr/bin/nvcc")
            .with_output("nvcc", "release 12.1, V12.1.105");
        let mut ui = MockUI::new();

        let run = Bootstrapper::new(&runner, Privilege::Root, EnvWriter::new(&profile))
            .run(&nvcc_target(), &mut ui);

        assert!(matches!(
            run.result,
            InstallResult::Installed(ToolVersion::Major(12))
        ));
        assert_eq!(
            run.transitions,
            vec![
                BootstrapState::Start,
                BootstrapState::Detect,
                BootstrapState::Install,
                BootstrapState::Verify,
                BootstrapState::WriteEnv,
                BootstrapState::Done
            ]
        );
        assert!(fs::read_to_string(&profile)
            .unwrap()
            .contains("# >>> llamastrap cuda >>>"));
    }

    #[test]
    fn still_absent_after_install_fails_without_env() {
        let temp = TempDir::new().unwrap();
        let profile = temp.path().join(".bashrc");
        let runner = apt_runner();
        let mut ui = MockUI::new();

        let run = Bootstrapper::new(&runner, Privilege::Root, EnvWriter::new(&profile))
            .run(&nvcc_target(), &mut ui);

        assert!(matches!(
            run.result,
            InstallResult::Failed(StrapError::ToolStillAbsent { .. })
        ));
        assert_eq!(run.final_state(), Some(BootstrapState::Fail));
        assert!(!run.transitions.contains(&BootstrapState::WriteEnv));
        assert!(!profile.exists());
    }

    #[test]
    fn install_failure_ends_in_fail() {
        let temp = TempDir::new().unwrap();
        let runner = apt_runner().with_failure("apt-get", 100);
        let mut ui = MockUI::new();

        let run = Bootstrapper::new(
            &runner,
            Privilege::Root,
            EnvWriter::new(temp.path().join(".bashrc")),
        )
        .run(&nvcc_target(), &mut ui);

        assert!(matches!(
            run.result,
            InstallResult::Failed(StrapError::ExternalCommandFailed { .. })
        ));
        assert!(!run.transitions.contains(&BootstrapState::Verify));
    }

    #[test]
    fn declined_confirmation_aborts_before_installing() {
        let temp = TempDir::new().unwrap();
        let runner = apt_runner();
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        ui.set_prompt_response("install_nvcc", "no");

        let run = Bootstrapper::new(
            &runner,
            Privilege::Root,
            EnvWriter::new(temp.path().join(".bashrc")),
        )
        .run(&nvcc_target(), &mut ui);

        assert!(matches!(
            run.result,
            InstallResult::Failed(StrapError::InstallDeclined { .. })
        ));
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn assume_yes_skips_the_prompt() {
        let temp = TempDir::new().unwrap();
        let runner = apt_runner().installs("apt-get", "nvcc", "/usr/bin/nvcc");
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        ui.set_prompt_response("install_nvcc", "no");

        let run = Bootstrapper::new(
            &runner,
            Privilege::Root,
            EnvWriter::new(temp.path().join(".bashrc")),
        )
        .assume_yes(true)
        .run(&nvcc_target(), &mut ui);

        assert!(run.is_success());
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn failed_prerequisite_fails_target() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        let mut ui = MockUI::new();
        let mut target = nvcc_target();
        target.prerequisites.push(Target {
            name: "git".to_string(),
            description: "git".to_string(),
            requirement: ToolRequirement::new("git", 2, r"git version (\d+)\.").unwrap(),
            method: InstallMethod::Packages(PackageSpec::new(["git"])),
            prerequisites: Vec::new(),
            env: None,
        });

        let run = Bootstrapper::new(
            &runner,
            Privilege::Root,
            EnvWriter::new(temp.path().join(".bashrc")),
        )
        .run(&target, &mut ui);

        assert!(matches!(
            run.result,
            InstallResult::Failed(StrapError::PlatformUnsupported { .. })
        ));
    }

    #[test]
    fn prompt_key_is_sanitized() {
        assert_eq!(prompt_key("llama-server"), "llama_server");
    }

    #[test]
    fn terminal_states() {
        assert!(BootstrapState::Done.is_terminal());
        assert!(BootstrapState::Fail.is_terminal());
        assert!(!BootstrapState::Verify.is_terminal());
    }
}
