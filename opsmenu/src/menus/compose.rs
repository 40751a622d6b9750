//! Docker Compose menu
//!
//! Every action works on the compose file found in the session's working
//! directory and fails before running anything when there is none.

use async_trait::async_trait;
use opsmenu_core::{CommandInvocation, OpsMenuError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::gate::{Answer, Gate};
use crate::menu::{Action, ActionContext, Menu, MenuItem};

/// Compose file names, in lookup order
pub const COMPOSE_FILES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// First compose file present in `dir`
pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
    COMPOSE_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

#[derive(Debug, Clone, Copy)]
enum ComposeAction {
    Up,
    Down,
    Ps,
    Logs,
    Pull,
    Build,
    Restart,
}

pub fn menu() -> Menu {
    Menu::new(
        "Docker Compose",
        vec![
            MenuItem::new("Compose Up", ComposeAction::Up),
            MenuItem::destructive("Compose Down", ComposeAction::Down),
            MenuItem::new("Compose PS", ComposeAction::Ps),
            MenuItem::new("Follow Compose Logs", ComposeAction::Logs),
            MenuItem::new("Pull Images", ComposeAction::Pull),
            MenuItem::new("Build", ComposeAction::Build),
            MenuItem::new("Restart Services", ComposeAction::Restart),
        ],
    )
}

/// The configured compose command pointed at the project's file
fn compose(ctx: &ActionContext<'_>) -> Result<CommandInvocation> {
    let dir = ctx.session().working_directory();
    let file = find_compose_file(dir)
        .ok_or_else(|| OpsMenuError::ComposeFileMissing(dir.to_path_buf()))?;
    debug!("Using compose file {}", file.display());

    let base = CommandInvocation::from_prefix(&ctx.settings().compose.command)
        .ok_or_else(|| OpsMenuError::Config("compose.command must name a program".to_string()))?;
    Ok(base.flag("-f").flag(file.display().to_string()))
}

#[async_trait]
impl Action for ComposeAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let base = compose(ctx)?;
        match self {
            ComposeAction::Up => {
                ctx.run(&base.flags(["up", "-d"])).await?;
            }
            ComposeAction::Down => {
                let volumes = ctx
                    .ask("Also remove named volumes (data is lost)?", Answer::No)
                    .await?;
                let gate = if volumes {
                    Gate::double(
                        "Stop the project and delete its volumes?",
                        "Volume data cannot be recovered. Are you sure?",
                    )
                } else {
                    Gate::single("Stop and remove the project's containers?")
                };
                ctx.confirm(&gate).await?;
                ctx.run(&base.flag("down").flag_if(volumes, "-v")).await?;
            }
            ComposeAction::Ps => {
                ctx.run(&base.flag("ps")).await?;
            }
            ComposeAction::Logs => {
                ctx.console().say("Following logs, press Ctrl+C to stop.")?;
                ctx.run(&base.flags(["logs", "-f"])).await?;
            }
            ComposeAction::Pull => {
                ctx.run(&base.flag("pull")).await?;
            }
            ComposeAction::Build => {
                ctx.run(&base.flag("build")).await?;
            }
            ComposeAction::Restart => {
                ctx.run(&base.flag("restart")).await?;
            }
        }
        Ok(())
    }
}
