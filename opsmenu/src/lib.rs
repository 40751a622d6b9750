//! opsmenu
//!
//! Numbered terminal menus around `docker`, `docker-compose`, `git`,
//! `ssh-keygen`/`ssh-add` and `psql`. Each menu item prompts for what it
//! needs, asks for confirmation when it is destructive, and runs the wrapped
//! tool with the terminal attached.
//!
//! Menus can be driven without a terminal or real tools by pairing a
//! [`console::Console`] over any reader/writer with a recording runner:
//!
//! ```no_run
//! use opsmenu::console::Console;
//! use opsmenu::menu::MenuEnv;
//! use opsmenu_core::{Session, Settings};
//! use opsmenu_exec::RecordingRunner;
//! use std::sync::Arc;
//!
//! # async fn example() -> opsmenu_core::Result<()> {
//! let input = std::io::Cursor::new(b"1\n12\n".to_vec());
//! let console = Console::new(input, std::io::stdout());
//! let runner = Arc::new(RecordingRunner::new());
//! let mut env = MenuEnv::new(console, runner.clone(), Session::new("."), Settings::default());
//!
//! opsmenu::menus::git::menu().run(&mut env).await?;
//! assert_eq!(runner.command_lines(), vec!["git status"]);
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// Run configuration: settings file, environment and flags.
pub mod config;

pub mod console;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

pub mod gate;
pub mod menu;
pub mod menus;

#[cfg(test)]
pub mod test_utils;
