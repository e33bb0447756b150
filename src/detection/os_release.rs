//! `/etc/os-release` parsing.
//!
//! The OS identification is informational only: it is logged at the start
//! of a run and a missing or malformed file never fails anything.

use std::collections::HashMap;
use std::path::Path;

/// Standard locations, in lookup order.
const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Parsed OS identification.
///
/// # Example
///
/// ```
/// use llamastrap::detection::OsRelease;
///
/// let os = OsRelease::parse(r#"
/// NAME="Ubuntu"
/// ID=ubuntu
/// VERSION_ID="22.04"
/// PRETTY_NAME="Ubuntu 22.04.4 LTS"
/// "#);
/// assert_eq!(os.id(), Some("ubuntu"));
/// assert_eq!(os.describe(), "Ubuntu 22.04.4 LTS");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    fields: HashMap<String, String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines, skipping blanks, comments and malformed lines.
    pub fn parse(content: &str) -> Self {
        let mut fields = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                fields.insert(key.trim().to_string(), unquote(value.trim()));
            }
        }

        Self { fields }
    }

    /// Load from the first standard location that exists.
    pub fn load() -> Option<Self> {
        OS_RELEASE_PATHS
            .iter()
            .find_map(|p| Self::load_from(Path::new(p)))
    }

    /// Load from a specific path, `None` if it can't be read.
    pub fn load_from(path: &Path) -> Option<Self> {
        std::fs::read_to_string(path)
            .ok()
            .map(|content| Self::parse(&content))
    }

    /// Look up a raw field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Machine-readable distribution id (`ubuntu`, `fedora`, ...).
    pub fn id(&self) -> Option<&str> {
        self.get("ID")
    }

    /// Distribution version (`22.04`, `40`, ...).
    pub fn version_id(&self) -> Option<&str> {
        self.get("VERSION_ID")
    }

    /// Best human-readable description available.
    pub fn describe(&self) -> String {
        if let Some(pretty) = self.get("PRETTY_NAME") {
            return pretty.to_string();
        }
        match (self.get("NAME"), self.version_id()) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name.to_string(),
            _ => "unknown OS".to_string(),
        }
    }
}

/// Remove surrounding quotes from a value.
fn unquote(value: &str) -> String {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
