//! Tool requirements: detection, version checking and installation.
//!
//! # Modules
//!
//! - [`requirement`] - What a tool must look like to count as installed
//! - [`version`] - Structured major-version extraction
//! - [`detector`] - Resolving a tool and checking its version
//! - [`installer`] - Package manager and source installs
//! - [`status`] - Detection and install outcome types

pub mod detector;
pub mod installer;
pub mod requirement;
pub mod status;
pub mod version;

pub use detector::Detector;
pub use installer::{InstallMethod, Installer, PackageSpec, Privilege};
pub use requirement::ToolRequirement;
pub use status::{Detection, InstallResult, VersionCheck};
pub use version::{ParsedVersion, ToolVersion, VersionPattern};
