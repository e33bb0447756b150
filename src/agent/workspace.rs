//! The directory an agent may read and write.
//!
//! Tool paths are relative to the workspace root. Absolute paths and `..`
//! components are rejected, and a path whose nearest existing ancestor
//! resolves outside the root (through a symlink) is rejected too.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::{json, Value};

use crate::error::Result;

use super::tools::{ToolCall, ToolResult};

/// A sandboxed workspace directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open the workspace at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a workspace-relative path to a path under the root.
    pub fn resolve(&self, relative: &str) -> std::result::Result<PathBuf, String> {
        let path = Path::new(relative);
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    return Err(format!("path must not contain '..': {}", relative))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(format!(
                        "path must be relative to the workspace: {}",
                        relative
                    ))
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }

        let resolved = self.root.join(path);
        let existing = resolved
            .ancestors()
            .find(|p| p.exists())
            .unwrap_or(self.root.as_path());
        let real = existing
            .canonicalize()
            .map_err(|e| format!("cannot resolve {}: {}", relative, e))?;
        if !real.starts_with(&self.root) {
            return Err(format!("path leaves the workspace: {}", relative));
        }

        Ok(resolved)
    }

    /// Run a tool call. Failures become error results for the model.
    pub fn execute(&self, call: &ToolCall) -> ToolResult {
        let outcome = match call {
            ToolCall::ListDir { path } => self.list_dir(path),
            ToolCall::ReadFile { path } => self.read_file(path),
            ToolCall::WriteFile { path, content } => self.write_file(path, content),
        };
        match outcome {
            Ok(result) => ToolResult::Ok { result },
            Err(message) => {
                tracing::debug!("{} failed: {}", call.describe(), message);
                ToolResult::Error { message }
            }
        }
    }

    fn list_dir(&self, relative: &str) -> std::result::Result<Value, String> {
        let dir = self.resolve(relative)?;
        let mut entries = fs::read_dir(&dir)
            .map_err(|e| format!("cannot list {}: {}", display(relative), e))?
            .map(|entry| {
                let entry = entry.map_err(|e| e.to_string())?;
                let file_type = entry.file_type().map_err(|e| e.to_string())?;
                Ok(json!({
                    "name": entry.file_name().to_string_lossy(),
                    "is_dir": file_type.is_dir(),
                    "is_file": file_type.is_file(),
                }))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;
        entries.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        Ok(Value::Array(entries))
    }

    fn read_file(&self, relative: &str) -> std::result::Result<Value, String> {
        let file = self.resolve(relative)?;
        let content = fs::read_to_string(&file)
            .map_err(|e| format!("cannot read {}: {}", display(relative), e))?;
        Ok(json!({ "content": content }))
    }

    fn write_file(&self, relative: &str, content: &str) -> std::result::Result<Value, String> {
        let file = self.resolve(relative)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create directories for {}: {}", relative, e))?;
        }
        fs::write(&file, content)
            .map_err(|e| format!("cannot write {}: {}", display(relative), e))?;
        tracing::info!("Agent wrote {}", file.display());
        Ok(json!({ "written": true, "bytes": content.len() }))
    }
}

fn display(relative: &str) -> &str {
    if relative.is_empty() {
        "."
    } else {
        relative
    }
}
