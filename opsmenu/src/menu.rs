//! Menu Dispatcher
//!
//! A [`Menu`] shows its items as a numbered list with an exit entry after
//! them, reads a selection, and runs the chosen [`Action`]. Destructive items
//! get a guarded [`ActionContext`]: it will not start any command until a
//! [`Gate`] on that context has been passed.

use async_trait::async_trait;
use colored::Colorize;
use opsmenu_core::{
    CapturedOutput, CommandInvocation, OpsMenuError, Outcome, Result, Session, Settings,
};
use opsmenu_exec::{require_tools, CommandRunner};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::gate::{self, Answer, Gate};

/// Everything an action can reach: terminal, runner, session and settings
pub struct MenuEnv {
    pub console: Console,
    pub runner: Arc<dyn CommandRunner>,
    pub session: Session,
    pub settings: Settings,
    check_prerequisites: bool,
}

impl MenuEnv {
    pub fn new(
        console: Console,
        runner: Arc<dyn CommandRunner>,
        session: Session,
        settings: Settings,
    ) -> Self {
        Self {
            console,
            runner,
            session,
            settings,
            check_prerequisites: true,
        }
    }

    /// Don't look for wrapped tools on PATH before entering a menu
    pub fn skip_prerequisite_checks(mut self) -> Self {
        self.check_prerequisites = false;
        self
    }

    /// Fail with [`OpsMenuError::MissingTool`] unless every tool is on PATH
    pub fn require(&self, tools: &[&str]) -> Result<()> {
        if self.check_prerequisites {
            require_tools(tools)
        } else {
            Ok(())
        }
    }
}

/// Per-selection view of the [`MenuEnv`] handed to an action
pub struct ActionContext<'a> {
    env: &'a mut MenuEnv,
    guarded: bool,
    approved: bool,
}

impl<'a> ActionContext<'a> {
    /// Context for a non-destructive item
    pub fn open(env: &'a mut MenuEnv) -> Self {
        Self {
            env,
            guarded: false,
            approved: false,
        }
    }

    /// Context for a destructive item
    pub fn guarded(env: &'a mut MenuEnv) -> Self {
        Self {
            env,
            guarded: true,
            approved: false,
        }
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.env.console
    }

    pub fn session(&self) -> &Session {
        &self.env.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.env.session
    }

    pub fn settings(&self) -> &Settings {
        &self.env.settings
    }

    /// The whole environment, for entering sub-menus
    pub fn env(&mut self) -> &mut MenuEnv {
        &mut *self.env
    }

    /// Treat the rest of this action as destructive.
    ///
    /// For items that only become destructive on some paths, such as
    /// replacing a file that already exists.
    pub fn guard(&mut self) {
        self.guarded = true;
    }

    /// Plain yes/no question that does not approve anything
    pub async fn ask(&mut self, prompt: &str, default: Answer) -> Result<bool> {
        let max_attempts = self.env.settings.prompt.max_attempts;
        gate::confirm(&mut self.env.console, prompt, default, max_attempts).await
    }

    /// Pass a confirmation gate or fail with [`OpsMenuError::Declined`]
    pub async fn confirm(&mut self, gate: &Gate) -> Result<()> {
        let max_attempts = self.env.settings.prompt.max_attempts;
        if gate.pass(&mut self.env.console, max_attempts).await? {
            self.approved = true;
            Ok(())
        } else {
            debug!("Gate declined: {:?}", gate);
            Err(OpsMenuError::Declined)
        }
    }

    /// Run a command attached to the terminal.
    ///
    /// Non-zero exits are reported as warnings and returned, not raised.
    pub async fn run(&mut self, invocation: &CommandInvocation) -> Result<Outcome> {
        if self.guarded && !self.approved {
            warn!("Refusing unconfirmed destructive command: {}", invocation);
            return Err(OpsMenuError::ConfirmationRequired(invocation.to_string()));
        }

        let bound = self.env.session.bind(invocation.clone());
        debug!("Running: {}", bound);
        let outcome = self.env.runner.run(&bound).await?;

        match outcome {
            Outcome::Exited(0) => {}
            Outcome::Exited(code) => {
                info!("`{}` exited with code {}", invocation, code);
                self.env.console.warn(format!(
                    "`{}` exited with code {}",
                    invocation, code
                ))?;
            }
            Outcome::Signaled => {
                self.env
                    .console
                    .warn(format!("`{}` was terminated by a signal", invocation))?;
            }
            Outcome::Interrupted => {
                self.env
                    .console
                    .warn(format!("`{}` interrupted", invocation))?;
            }
        }
        Ok(outcome)
    }

    /// Run a read-only query and collect its output
    pub async fn capture(&mut self, invocation: &CommandInvocation) -> Result<CapturedOutput> {
        let bound = self.env.session.bind(invocation.clone());
        self.env.runner.capture(&bound).await
    }
}

/// Something a menu item does when selected
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()>;
}

/// A labelled entry in a menu
pub struct MenuItem {
    label: String,
    action: Box<dyn Action>,
    destructive: bool,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: impl Action + 'static) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
            destructive: false,
        }
    }

    /// An item whose commands only run after a confirmation gate
    pub fn destructive(label: impl Into<String>, action: impl Action + 'static) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
            destructive: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_destructive(&self) -> bool {
        self.destructive
    }
}

/// What a line typed at the menu prompt selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based item index
    Item(usize),
    Exit,
}

/// Parse a selection for a menu of `count` items; the exit entry is `count + 1`.
pub fn parse_selection(input: &str, count: usize) -> Option<Selection> {
    let number: usize = input.trim().parse().ok()?;
    match number {
        n if (1..=count).contains(&n) => Some(Selection::Item(n - 1)),
        n if n == count + 1 => Some(Selection::Exit),
        _ => None,
    }
}

/// A titled list of items
pub struct Menu {
    title: String,
    items: Vec<MenuItem>,
    exit_label: String,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
            exit_label: "Exit".to_string(),
        }
    }

    /// Rename the exit entry, e.g. "Back" for sub-menus
    pub fn with_exit_label(mut self, label: impl Into<String>) -> Self {
        self.exit_label = label.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    fn render(&self, console: &mut Console) -> Result<()> {
        console.say("")?;
        console.say(crate::format::format_heading(&self.title))?;
        for (idx, item) in self.items.iter().enumerate() {
            let label = if item.destructive {
                item.label.red().to_string()
            } else {
                item.label.clone()
            };
            console.say(format!("  {:>2}) {}", idx + 1, label))?;
        }
        console.say(format!(
            "  {:>2}) {}",
            self.items.len() + 1,
            self.exit_label.dimmed()
        ))
    }

    /// Loop until the exit entry is chosen.
    ///
    /// Returns `Err` for interrupts and closed input so enclosing menus stop
    /// too, and for fatal errors. Everything else is reported and the menu is
    /// shown again.
    pub async fn run(&self, env: &mut MenuEnv) -> Result<()> {
        info!("Entering menu: {}", self.title);
        loop {
            self.render(&mut env.console)?;
            let input = env.console.prompt("Select an option").await?;

            let idx = match parse_selection(&input, self.items.len()) {
                Some(Selection::Item(idx)) => idx,
                Some(Selection::Exit) => {
                    info!("Leaving menu: {}", self.title);
                    return Ok(());
                }
                None => {
                    env.console.error(format!(
                        "Invalid selection '{}': choose 1-{}",
                        input,
                        self.items.len() + 1
                    ))?;
                    continue;
                }
            };

            let item = &self.items[idx];
            debug!("Selected: {}", item.label);

            let mut ctx = if item.destructive {
                ActionContext::guarded(env)
            } else {
                ActionContext::open(env)
            };

            match item.action.execute(&mut ctx).await {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => env.console.error(e)?,
                Err(e) => return Err(e),
            }
        }
    }
}
