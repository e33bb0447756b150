//! Idempotent profile appends.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StrapError};

use super::block::EnvBlock;

/// What [`EnvWriter::append`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The block was appended and confirmed on disk.
    Appended,
    /// The marker was already in the file; nothing was written.
    AlreadyPresent,
}

/// Appends [`EnvBlock`]s to one profile file.
///
/// Existing content is never rewritten or removed.
#[derive(Debug, Clone)]
pub struct EnvWriter {
    path: PathBuf,
}

impl EnvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the profile already holds `block`'s marker.
    ///
    /// A missing profile holds nothing.
    pub fn contains(&self, block: &EnvBlock) -> Result<bool> {
        Ok(block.is_present_in(&self.read()?))
    }

    /// Append `block` unless its marker is already present.
    pub fn append(&self, block: &EnvBlock) -> Result<WriteOutcome> {
        block.validate()?;

        if self.contains(block)? {
            tracing::debug!(
                "Block '{}' already present in {}",
                block.marker(),
                self.path.display()
            );
            return Ok(WriteOutcome::AlreadyPresent);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("\n{}", block.render()).as_bytes())?;
        file.sync_all()?;
        drop(file);

        if !self.contains(block)? {
            return Err(StrapError::EnvWriteUnconfirmed {
                marker: block.marker().to_string(),
                path: self.path.clone(),
            });
        }

        tracing::debug!(
            "Appended block '{}' to {}",
            block.marker(),
            self.path.display()
        );
        Ok(WriteOutcome::Appended)
    }

    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn block() -> EnvBlock {
        EnvBlock::new("llamastrap llama.cpp")
            .export("LLAMA_CPP_ROOT", "/home/me/llama.cpp")
            .export("PATH", "/home/me/llama.cpp/build/bin:$PATH")
    }

    #[test]
    fn creates_missing_profile() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".bashrc");

        let outcome = EnvWriter::new(&path).append(&block()).unwrap();

        assert_eq!(outcome, WriteOutcome::Appended);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("\n{}", block().render()));
    }

    #[test]
    fn appends_after_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".zshrc");
        fs::write(&path, "alias ll='ls -l'\n").unwrap();

        EnvWriter::new(&path).append(&block()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("alias ll='ls -l'\n\n# >>> llamastrap llama.cpp >>>\n"));
    }

    #[test]
    fn second_append_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".bashrc");
        let writer = EnvWriter::new(&path);

        writer.append(&block()).unwrap();
        let once = fs::read_to_string(&path).unwrap();
        let outcome = writer.append(&block()).unwrap();
        let twice = fs::read_to_string(&path).unwrap();

        assert_eq!(outcome, WriteOutcome::AlreadyPresent);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("# >>> llamastrap llama.cpp >>>").count(), 1);
    }

    #[test]
    fn invalid_block_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".bashrc");

        let err = EnvWriter::new(&path)
            .append(&EnvBlock::new("empty"))
            .unwrap_err();

        assert!(matches!(err, StrapError::InvalidEnvBlock { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn distinct_markers_coexist() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".profile");
        let writer = EnvWriter::new(&path);
        let cuda = EnvBlock::new("llamastrap cuda").export("CUDA_HOME", "/usr/local/cuda");

        assert_eq!(writer.append(&cuda).unwrap(), WriteOutcome::Appended);
        assert_eq!(writer.append(&block()).unwrap(), WriteOutcome::Appended);
        assert!(writer.contains(&cuda).unwrap());
        assert!(writer.contains(&block()).unwrap());
    }

    #[test]
    fn missing_profile_contains_nothing() {
        let temp = TempDir::new().unwrap();
        let writer = EnvWriter::new(temp.path().join("nope"));
        assert!(!writer.contains(&block()).unwrap());
    }
}
