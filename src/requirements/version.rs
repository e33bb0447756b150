//! Structured version extraction.
//!
//! A [`VersionPattern`] is a regular expression with exactly one capture
//! group holding the major version. Parsing never fails: output that
//! doesn't match yields [`ParsedVersion::Unparsable`] with a reason, so
//! callers decide how to treat format drift.

use regex::Regex;
use std::fmt;

/// Outcome of extracting a major version from tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    /// The major version was found.
    Major(u32),
    /// No line matched, or the captured text was not a number.
    Unparsable { reason: String },
}

impl ParsedVersion {
    /// The major version, if one was found.
    pub fn major(&self) -> Option<u32> {
        match self {
            ParsedVersion::Major(m) => Some(*m),
            ParsedVersion::Unparsable { .. } => None,
        }
    }
}

/// A version as reported to the user after a bootstrap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolVersion {
    Major(u32),
    Unknown,
}

impl From<&ParsedVersion> for ToolVersion {
    fn from(parsed: &ParsedVersion) -> Self {
        parsed
            .major()
            .map(ToolVersion::Major)
            .unwrap_or(ToolVersion::Unknown)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolVersion::Major(m) => write!(f, "major {}", m),
            ToolVersion::Unknown => f.write_str("unknown version"),
        }
    }
}

/// A compiled version-extraction pattern with exactly one capture group.
///
/// # Example
///
/// ```
/// use llamastrap::requirements::{ParsedVersion, VersionPattern};
///
/// let pattern = VersionPattern::new(r"release\s+(\d+)\.").unwrap();
/// let output = "nvcc: NVIDIA (R) Cuda compiler driver\n\
///               Cuda compilation tools, release 11.2, V11.2.67";
/// assert_eq!(pattern.parse(output), ParsedVersion::Major(11));
/// ```
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Compile a pattern, checking it has exactly one capture group.
    pub fn new(pattern: &str) -> Result<Self, String> {
        let regex = Regex::new(pattern).map_err(|e| format!("invalid pattern: {}", e))?;

        // captures_len() includes the implicit whole-match group.
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(format!(
                "pattern must have exactly one capture group, found {}",
                groups
            ));
        }

        Ok(Self { regex })
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Find the first matching line in `output` and extract the major version.
    pub fn parse(&self, output: &str) -> ParsedVersion {
        let Some(caps) = output.lines().find_map(|line| self.regex.captures(line)) else {
            return ParsedVersion::Unparsable {
                reason: format!("no line matches '{}'", self.as_str()),
            };
        };

        let Some(group) = caps.get(1) else {
            return ParsedVersion::Unparsable {
                reason: "capture group did not participate in the match".to_string(),
            };
        };

        match group.as_str().parse::<u32>() {
            Ok(major) => ParsedVersion::Major(major),
            Err(_) => ParsedVersion::Unparsable {
                reason: format!("'{}' is not a number", group.as_str()),
            },
        }
    }
}
