//! External process execution and shell environment helpers.

pub mod command;
pub mod platform;
pub mod scripted;

pub use command::{
    is_executable, parse_system_path, resolve_tool_path, search_path, CommandResult,
    CommandRunner, Invocation, SystemRunner,
};
pub use platform::{
    default_profile_file, detect_shell, expand_home, is_ci, is_elevated, ShellType,
};
pub use scripted::ScriptedRunner;
