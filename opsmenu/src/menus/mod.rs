//! The tool menus and the hub that links them
//!
//! - [`docker`] - containers and images
//! - [`compose`] - compose projects in the session directory
//! - [`git`] - branches, commits and remotes
//! - [`ssh`] - key generation and the ssh agent
//! - [`postgres`] - databases and roles through psql

pub mod compose;
pub mod docker;
pub mod git;
pub mod postgres;
pub mod ssh;

use async_trait::async_trait;
use opsmenu_core::{Result, Settings};

use crate::menu::{Action, ActionContext, Menu, MenuEnv, MenuItem};

/// One of the tool menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MenuKind {
    Docker,
    Compose,
    Git,
    Ssh,
    Postgres,
}

impl MenuKind {
    pub const ALL: [MenuKind; 5] = [
        MenuKind::Docker,
        MenuKind::Compose,
        MenuKind::Git,
        MenuKind::Ssh,
        MenuKind::Postgres,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MenuKind::Docker => "Docker",
            MenuKind::Compose => "Docker Compose",
            MenuKind::Git => "Git",
            MenuKind::Ssh => "SSH Keys",
            MenuKind::Postgres => "PostgreSQL",
        }
    }

    /// Programs that must be on PATH before the menu opens
    pub fn required_tools(&self, settings: &Settings) -> Vec<String> {
        match self {
            MenuKind::Docker => vec!["docker".to_string()],
            MenuKind::Compose => settings.compose.command.iter().take(1).cloned().collect(),
            MenuKind::Git => vec!["git".to_string()],
            MenuKind::Ssh => vec!["ssh-keygen".to_string(), "ssh-add".to_string()],
            MenuKind::Postgres => vec!["psql".to_string()],
        }
    }

    pub fn build(&self) -> Menu {
        match self {
            MenuKind::Docker => docker::menu(),
            MenuKind::Compose => compose::menu(),
            MenuKind::Git => git::menu(),
            MenuKind::Ssh => ssh::menu(),
            MenuKind::Postgres => postgres::menu(),
        }
    }
}

fn require_tools(kind: MenuKind, env: &MenuEnv) -> Result<()> {
    let tools = kind.required_tools(&env.settings);
    let tools: Vec<&str> = tools.iter().map(String::as_str).collect();
    env.require(&tools)
}

/// Check the menu's tools, then run it as the top-level menu
pub async fn enter(kind: MenuKind, env: &mut MenuEnv) -> Result<()> {
    require_tools(kind, env)?;
    kind.build().run(env).await
}

/// Opens a tool menu from the hub
struct OpenMenu(MenuKind);

#[async_trait]
impl Action for OpenMenu {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let env = ctx.env();
        require_tools(self.0, env)?;
        self.0.build().with_exit_label("Back").run(env).await
    }
}

/// Top-level menu listing every tool menu
pub fn hub() -> Menu {
    let items = MenuKind::ALL
        .iter()
        .map(|kind| MenuItem::new(kind.title(), OpenMenu(*kind)))
        .collect();
    Menu::new("opsmenu", items)
}
