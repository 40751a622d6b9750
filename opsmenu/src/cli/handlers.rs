//! Command execution handlers

use anyhow::{bail, Context, Result};
use opsmenu_core::Settings;
use tracing::info;

use crate::config::RunConfig;
use crate::format::{format_settings, format_success};
use crate::menu::MenuEnv;
use crate::menus::{self, MenuKind};

use super::commands::*;

/// Open one menu, or the hub when `kind` is `None`
pub async fn handle_menu(kind: Option<MenuKind>, env: &mut MenuEnv) -> opsmenu_core::Result<()> {
    match kind {
        Some(kind) => menus::enter(kind, env).await,
        None => menus::hub().run(env).await,
    }
}

/// Handle config command
pub fn handle_config(command: ConfigCommands, config: &RunConfig) -> Result<()> {
    match command {
        ConfigCommands::Show { format } => {
            println!("{}", format_settings(&config.settings, &(&format).into())?);
        }
        ConfigCommands::Path => {
            println!("{}", config.config_path.display());
        }
        ConfigCommands::Init { force } => {
            init_config(config, force)?;
            println!(
                "{}",
                format_success(&format!("Wrote {}", config.config_path.display()))
            );
        }
    }
    Ok(())
}

/// Write default settings to the configured path
fn init_config(config: &RunConfig, force: bool) -> Result<()> {
    let path = &config.config_path;
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Settings::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default settings to {}", path.display());
    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
