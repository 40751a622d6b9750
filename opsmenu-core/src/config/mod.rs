//! Configuration types for opsmenu
//!
//! [`Settings`] holds one section per menu and is loaded once at startup.
//! The CLI layers environment variables and flags on top of it.

mod paths;
mod settings;

pub use paths::{default_config_path, default_ssh_dir};
pub use settings::{
    ComposeSettings, DockerSettings, GitSettings, PostgresSettings, PromptSettings, Settings,
    SshSettings,
};
