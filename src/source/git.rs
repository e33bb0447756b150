//! Git checkout management.
//!
//! Clones a repository or fetches into an existing checkout, then selects
//! a revision to build: the most recently created tag, or the remote's
//! default branch when the repository has no tags.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::shell::{CommandRunner, Invocation};

/// A revision selected for building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// A tag, by name.
    Tag(String),
    /// A remote-tracking branch such as `origin/master`.
    Branch(String),
}

impl Revision {
    /// Name to pass to `git checkout`.
    pub fn refspec(&self) -> &str {
        match self {
            Revision::Tag(name) | Revision::Branch(name) => name,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Tag(name) => write!(f, "tag {}", name),
            Revision::Branch(name) => write!(f, "branch {}", name),
        }
    }
}

/// A git working copy at a fixed location.
pub struct GitCheckout<'a> {
    runner: &'a dyn CommandRunner,
    root: PathBuf,
}

impl<'a> GitCheckout<'a> {
    /// Create a handle for the checkout at `root`.
    pub fn new(runner: &'a dyn CommandRunner, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    /// Checkout location.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `root` already holds a git checkout.
    pub fn is_checkout(&self) -> bool {
        self.root.join(".git").exists()
    }

    /// Clone `url` into the root, or fetch branches and tags if it is
    /// already a checkout.
    pub fn sync(&self, url: &str) -> Result<()> {
        let invocation = if self.is_checkout() {
            tracing::debug!("Fetching into existing checkout {}", self.root.display());
            self.git(&["fetch", "--tags", "--force", "origin"])
        } else {
            if let Some(parent) = self.root.parent() {
                std::fs::create_dir_all(parent)?;
            }
            tracing::debug!("Cloning {} into {}", url, self.root.display());
            Invocation::new("git")
                .args(["clone", url])
                .arg(self.root.to_string_lossy())
        };

        self.runner.run_checked(&invocation)?;
        Ok(())
    }

    /// The most recently created tag, if the repository has any.
    pub fn latest_tag(&self) -> Result<Option<String>> {
        let output = self
            .runner
            .run_checked(&self.git(&["tag", "--sort=-creatordate"]).captured())?;

        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string))
    }

    /// The remote's default branch as a remote-tracking name.
    ///
    /// Falls back to `origin/HEAD` when `origin/HEAD` isn't a symbolic ref,
    /// which happens for checkouts created by older git versions.
    pub fn default_branch(&self) -> Result<String> {
        let query = self
            .git(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
            .captured();
        let result = self.runner.run(&query)?;

        let branch = result.stdout.trim();
        if result.success && !branch.is_empty() {
            Ok(branch.to_string())
        } else {
            Ok("origin/HEAD".to_string())
        }
    }

    /// Pick the revision to build.
    pub fn select_revision(&self) -> Result<Revision> {
        match self.latest_tag()? {
            Some(tag) => Ok(Revision::Tag(tag)),
            None => {
                tracing::debug!("No tags found, using the default branch");
                Ok(Revision::Branch(self.default_branch()?))
            }
        }
    }

    /// Check out `revision` as a detached HEAD, discarding local changes.
    pub fn checkout(&self, revision: &Revision) -> Result<()> {
        self.runner.run_checked(&self.git(&[
            "checkout",
            "--force",
            "--detach",
            revision.refspec(),
        ]))?;
        Ok(())
    }

    fn git(&self, args: &[&str]) -> Invocation {
        Invocation::new("git")
            .args(args.iter().copied())
            .current_dir(&self.root)
    }
}
