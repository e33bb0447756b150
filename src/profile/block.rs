//! Delimited environment blocks.

use crate::error::{Result, StrapError};

/// A named block of `export` lines for a shell profile.
///
/// # Example
///
/// ```
/// use llamastrap::profile::EnvBlock;
///
/// let block = EnvBlock::new("llamastrap cuda")
///     .export("CUDA_HOME", "/usr/local/cuda")
///     .export("PATH", "/usr/local/cuda/bin:$PATH");
///
/// block.validate().unwrap();
/// assert!(block.render().contains("export PATH=\"/usr/local/cuda/bin:$PATH\"\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBlock {
    marker: String,
    exports: Vec<(String, String)>,
}

impl EnvBlock {
    /// Start an empty block identified by `marker`.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            exports: Vec::new(),
        }
    }

    /// Append an export. Order is preserved.
    pub fn export(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.exports.push((key.into(), value.into()));
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn exports(&self) -> &[(String, String)] {
        &self.exports
    }

    /// Check the marker, keys and export count.
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(self.invalid("marker must not be empty"));
        }
        if self.marker.contains(['\n', '\r']) {
            return Err(self.invalid("marker must be a single line"));
        }
        if self.exports.is_empty() {
            return Err(self.invalid("at least one export is required"));
        }
        for (key, value) in &self.exports {
            if !is_shell_identifier(key) {
                return Err(self.invalid(&format!("'{}' is not a valid variable name", key)));
            }
            if value.contains(['\n', '\r']) {
                return Err(self.invalid(&format!("value of '{}' spans multiple lines", key)));
            }
        }
        Ok(())
    }

    /// The line that opens the block.
    pub fn opening_line(&self) -> String {
        format!("# >>> {} >>>", self.marker)
    }

    /// The line that closes the block.
    pub fn closing_line(&self) -> String {
        format!("# <<< {} <<<", self.marker)
    }

    /// Render the block, ending with a newline.
    pub fn render(&self) -> String {
        let mut out = self.opening_line();
        out.push('\n');
        for (key, value) in &self.exports {
            out.push_str(&format!("export {}=\"{}\"\n", key, escape_value(value)));
        }
        out.push_str(&self.closing_line());
        out.push('\n');
        out
    }

    /// Whether `content` already holds this block's opening line.
    pub fn is_present_in(&self, content: &str) -> bool {
        let opening = self.opening_line();
        content.lines().any(|line| line.trim() == opening)
    }

    fn invalid(&self, message: &str) -> StrapError {
        StrapError::InvalidEnvBlock {
            marker: self.marker.clone(),
            message: message.to_string(),
        }
    }
}

/// Escape a value for a double-quoted shell string.
///
/// Backslashes and double quotes are escaped. `$` is kept so references
/// like `$PATH` expand when the profile is sourced.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_shell_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
