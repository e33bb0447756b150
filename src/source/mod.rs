//! Building tools from source.
//!
//! A source build clones (or fetches) a git repository, checks out the
//! newest tag, then configures and compiles it with CMake. Binaries end up
//! in `<root>/build/bin`.

pub mod cmake;
pub mod git;

pub use git::{GitCheckout, Revision};

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

/// Where and how to build a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuild {
    /// Repository to clone.
    pub repo_url: String,
    /// Checkout location.
    pub root: PathBuf,
    /// Extra arguments for the CMake configure step.
    pub cmake_flags: Vec<String>,
    /// Value for `CMAKE_CUDA_ARCHITECTURES`, if set.
    pub cuda_architectures: Option<String>,
    /// Parallel compile jobs.
    pub jobs: usize,
}

impl SourceBuild {
    /// A build of `repo_url` at `root` with no extra flags.
    pub fn new(repo_url: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            repo_url: repo_url.into(),
            root: root.into(),
            cmake_flags: Vec::new(),
            cuda_architectures: None,
            jobs: cmake::default_jobs(),
        }
    }

    pub fn with_cmake_flags(mut self, flags: Vec<String>) -> Self {
        self.cmake_flags = flags;
        self
    }

    pub fn with_cuda_architectures(mut self, architectures: Option<String>) -> Self {
        self.cuda_architectures = architectures;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// CMake binary directory.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Directory the built executables land in.
    pub fn bin_dir(&self) -> PathBuf {
        self.build_dir().join("bin")
    }

    /// Checkout location.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Runs a [`SourceBuild`] end to end.
pub struct SourceInstaller<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> SourceInstaller<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Sync the checkout, check out the newest revision and compile it.
    ///
    /// Returns the revision that was built.
    pub fn install(&self, build: &SourceBuild, ui: &mut dyn UserInterface) -> Result<Revision> {
        let checkout = GitCheckout::new(self.runner, &build.root);

        if checkout.is_checkout() {
            ui.message(&format!("Updating {}", build.root.display()));
        } else {
            ui.message(&format!(
                "Cloning {} into {}",
                build.repo_url,
                build.root.display()
            ));
        }
        checkout.sync(&build.repo_url)?;

        let revision = checkout.select_revision()?;
        ui.message(&format!("Checking out {}", revision));
        checkout.checkout(&revision)?;

        let configure = cmake::configure_command(build);
        ui.message(&format!("Configuring: {}", configure.display()));
        self.runner.run_checked(&configure)?;

        let compile = cmake::build_command(build);
        ui.message(&format!("Compiling: {}", compile.display()));
        self.runner.run_checked(&compile)?;

        tracing::info!("Built {} at {}", build.root.display(), revision);
        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrapError;
    use crate::shell::ScriptedRunner;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn fresh_build_clones_checks_out_and_compiles() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("llama.cpp");
        let build = SourceBuild::new("https://github.com/ggml-org/llama.cpp", &root).with_jobs(4);
        let runner = ScriptedRunner::new()
            .with_output("git", "")
            .with_output("git", "b4589\nb4588\n");
        let mut ui = MockUI::new();

        let revision = SourceInstaller::new(&runner).install(&build, &mut ui).unwrap();

        assert_eq!(revision, Revision::Tag("b4589".to_string()));
        let lines = runner.command_lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("git clone https://github.com/ggml-org/llama.cpp"));
        assert_eq!(lines[1], "git tag --sort=-creatordate");
        assert_eq!(lines[2], "git checkout --force --detach b4589");
        assert!(lines[3].starts_with("cmake -S"));
        assert!(lines[4].ends_with("--config Release -j 4"));
        assert!(ui.has_message("Cloning"));
    }

    #[test]
    fn configure_failure_skips_compile() {
        let temp = TempDir::new().unwrap();
        let build = SourceBuild::new("https://example.com/repo", temp.path().join("repo"));
        let runner = ScriptedRunner::new()
            .with_output("git", "")
            .with_output("git", "v1\n")
            .with_failure("cmake", 1);
        let mut ui = MockUI::new();

        let err = SourceInstaller::new(&runner)
            .install(&build, &mut ui)
            .unwrap_err();

        assert!(matches!(err, StrapError::ExternalCommandFailed { .. }));
        assert_eq!(
            runner
                .invocations()
                .iter()
                .filter(|inv| inv.program == "cmake")
                .count(),
            1
        );
    }

    #[test]
    fn bin_dir_is_under_build() {
        let build = SourceBuild::new("u", "/opt/llama.cpp");
        assert_eq!(build.bin_dir(), PathBuf::from("/opt/llama.cpp/build/bin"));
    }
}
