//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including debug-level detail lines.
    Verbose,
    /// Show progress and status.
    #[default]
    Normal,
    /// Show only results, warnings and errors.
    Quiet,
}

impl OutputMode {
    /// Pick a mode from the `--verbose`/`--quiet` flags.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if this mode shows progress messages.
    pub fn shows_messages(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if this mode shows progress spinners.
    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}
