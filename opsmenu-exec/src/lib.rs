//! opsmenu-exec
//!
//! Process execution crate: runs wrapped tools as child processes and checks
//! that they are installed. Used by the interactive menus.
//!
//! Public API:
//! - `runner::CommandRunner` - execution seam the menus depend on
//! - `runner::ProcessRunner` - real child processes with Ctrl+C handling
//! - `runner::RecordingRunner` - records instead of executing (dry runs)
//! - `prereq::require_tools` - PATH check for a menu's tools

pub mod prereq;
pub mod runner;

pub use prereq::{find_tool, require_tools};
pub use runner::{CommandRunner, ProcessRunner, RecordingRunner};
