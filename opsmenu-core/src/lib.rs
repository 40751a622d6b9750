//! opsmenu Core Library
//!
//! Shared types, settings, and errors for the opsmenu tool menus.
//! This crate is used by both the process runner and the interactive CLI.

pub mod config;
pub mod error;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::{default_config_path, default_ssh_dir, Settings};
pub use error::*;
pub use session::{AuthMethod, Session, GIT_SSH_COMMAND};
pub use types::*;
