//! Host detection: OS identification and system package manager.

pub mod os_release;
pub mod package_manager;

pub use os_release::OsRelease;
pub use package_manager::{detect_package_manager, PackageManager};
