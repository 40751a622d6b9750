//! Git menu
//!
//! Works on the repository in the session's working directory. The remote
//! and auth method picked here are kept in the [`Session`] so later pushes
//! and pulls use them.
//!
//! [`Session`]: opsmenu_core::Session

use async_trait::async_trait;
use opsmenu_core::{AuthMethod, CommandInvocation, OpsMenuError, Result};
use tracing::debug;

use crate::gate::{Answer, Gate};
use crate::menu::{Action, ActionContext, Menu, MenuItem};

#[derive(Debug, Clone, Copy)]
enum GitAction {
    Status,
    Log,
    CommitAndPush,
    Pull,
    CreateBranch,
    SwitchBranch,
    MergeBranch,
    DeleteBranch,
    ResetToRemote,
    SelectAuth,
    SetRemote,
}

pub fn menu() -> Menu {
    Menu::new(
        "Git",
        vec![
            MenuItem::new("Status", GitAction::Status),
            MenuItem::new("Show Log", GitAction::Log),
            MenuItem::new("Commit & Push", GitAction::CommitAndPush),
            MenuItem::new("Pull", GitAction::Pull),
            MenuItem::new("Create Branch", GitAction::CreateBranch),
            MenuItem::new("Switch Branch", GitAction::SwitchBranch),
            MenuItem::new("Merge Branch", GitAction::MergeBranch),
            MenuItem::destructive("Delete Branch", GitAction::DeleteBranch),
            MenuItem::destructive("Reset to Remote", GitAction::ResetToRemote),
            MenuItem::new("Select Auth Method", GitAction::SelectAuth),
            MenuItem::new("Set Remote", GitAction::SetRemote),
        ],
    )
}

fn git() -> CommandInvocation {
    CommandInvocation::new("git")
}

/// Remote chosen this session, else the configured one
fn active_remote(ctx: &ActionContext<'_>) -> String {
    ctx.session()
        .remote()
        .map(str::to_string)
        .unwrap_or_else(|| ctx.settings().git.remote.clone())
}

/// Run a query and return its non-empty output lines
async fn query(ctx: &mut ActionContext<'_>, invocation: CommandInvocation) -> Result<Vec<String>> {
    let captured = ctx.capture(&invocation).await?;
    if !captured.outcome.success() {
        return Err(OpsMenuError::QueryFailed {
            command: invocation.to_string(),
            message: captured.stderr.trim().to_string(),
        });
    }
    Ok(captured.lines().into_iter().map(str::to_string).collect())
}

async fn current_branch(ctx: &mut ActionContext<'_>) -> Result<String> {
    let invocation = git().flags(["rev-parse", "--abbrev-ref", "HEAD"]);
    let lines = query(ctx, invocation.clone()).await?;
    match lines.into_iter().next() {
        Some(branch) => {
            debug!("Current branch: {}", branch);
            Ok(branch)
        }
        None => Err(OpsMenuError::QueryFailed {
            command: invocation.to_string(),
            message: "no branch name returned".to_string(),
        }),
    }
}

/// Print local branches, marking `current`
async fn show_branches(ctx: &mut ActionContext<'_>, current: &str) -> Result<()> {
    let branches = query(ctx, git().flags(["branch", "--format=%(refname:short)"])).await?;
    ctx.console().say("Branches:")?;
    for branch in branches {
        let marker = if branch == current { "*" } else { " " };
        ctx.console().say(format!("  {} {}", marker, branch))?;
    }
    Ok(())
}

#[async_trait]
impl Action for GitAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        match self {
            GitAction::Status => {
                ctx.run(&git().flag("status")).await?;
            }
            GitAction::Log => {
                let count = ctx.settings().git.log_count.to_string();
                ctx.run(&git().flags(["log", "--oneline", "--graph", "--decorate", "-n"]).flag(count))
                    .await?;
            }
            GitAction::CommitAndPush => {
                let branch = current_branch(ctx).await?;
                let message = ctx.console().prompt_required("Commit message").await?;
                let remote = active_remote(ctx);

                if !ctx.run(&git().flags(["add", "-A"])).await?.success() {
                    return Ok(());
                }
                if !ctx.run(&git().flags(["commit", "-m"]).target(message)).await?.success() {
                    return Ok(());
                }
                if ctx
                    .run(&git().flag("push").target(remote.as_str()).target(branch.as_str()))
                    .await?
                    .success()
                {
                    ctx.console()
                        .success(format!("Pushed {} to {}", branch, remote))?;
                }
            }
            GitAction::Pull => {
                let branch = current_branch(ctx).await?;
                let remote = active_remote(ctx);
                ctx.run(&git().flag("pull").target(remote).target(branch)).await?;
            }
            GitAction::CreateBranch => {
                let name = ctx.console().prompt_required("New branch name").await?;
                ctx.run(&git().flags(["checkout", "-b"]).target(name)).await?;
            }
            GitAction::SwitchBranch => {
                let current = current_branch(ctx).await?;
                show_branches(ctx, &current).await?;
                let name = ctx.console().prompt_required("Branch to switch to").await?;
                ctx.run(&git().flag("checkout").target(name)).await?;
            }
            GitAction::MergeBranch => {
                let current = current_branch(ctx).await?;
                show_branches(ctx, &current).await?;
                let name = ctx
                    .console()
                    .prompt_required(&format!("Branch to merge into {}", current))
                    .await?;
                if name == current {
                    return Err(OpsMenuError::InvalidInput(format!(
                        "cannot merge {} into itself",
                        name
                    )));
                }
                ctx.run(&git().flag("merge").target(name)).await?;
            }
            GitAction::DeleteBranch => {
                let current = current_branch(ctx).await?;
                show_branches(ctx, &current).await?;
                let name = ctx.console().prompt_required("Branch to delete").await?;
                if name == current {
                    return Err(OpsMenuError::InvalidInput(format!(
                        "cannot delete the checked-out branch {}",
                        name
                    )));
                }

                let force = ctx
                    .ask("Force delete even if not fully merged?", Answer::No)
                    .await?;
                let gate = if force {
                    Gate::double(
                        format!("Force delete branch {}?", name),
                        "Unmerged commits on it will be lost. Are you sure?",
                    )
                } else {
                    Gate::single(format!("Delete branch {}?", name))
                };
                ctx.confirm(&gate).await?;
                ctx.run(
                    &git()
                        .flag("branch")
                        .flag(if force { "-D" } else { "-d" })
                        .target(name),
                )
                .await?;
            }
            GitAction::ResetToRemote => {
                let branch = current_branch(ctx).await?;
                let remote = active_remote(ctx);
                let upstream = format!("{}/{}", remote, branch);
                ctx.confirm(&Gate::double(
                    format!(
                        "Discard all local changes and commits on {} and reset to {}?",
                        branch, upstream
                    ),
                    "This cannot be undone. Are you sure?",
                ))
                .await?;
                if ctx.run(&git().flag("fetch").target(remote)).await?.success() {
                    ctx.run(&git().flags(["reset", "--hard"]).target(upstream))
                        .await?;
                }
            }
            GitAction::SelectAuth => {
                ctx.console().say("  1) SSH key")?;
                ctx.console().say("  2) HTTPS (credential helper)")?;
                let choice = ctx.console().prompt("Auth method").await?;
                let method = match choice.as_str() {
                    "1" => {
                        let ssh = &ctx.settings().ssh;
                        let default_key = ssh.key_dir.join(format!("id_{}", ssh.key_type));
                        let key = ctx
                            .console()
                            .prompt_default("Private key", &default_key.display().to_string())
                            .await?;
                        let key = ctx.session().resolve(key);
                        if !key.is_file() {
                            return Err(OpsMenuError::InvalidInput(format!(
                                "no key file at {}",
                                key.display()
                            )));
                        }
                        AuthMethod::Ssh { key }
                    }
                    "2" => AuthMethod::Https,
                    other => {
                        return Err(OpsMenuError::InvalidInput(format!(
                            "unknown auth method '{}'",
                            other
                        )))
                    }
                };
                ctx.console().success(format!("Using {}", method))?;
                ctx.session_mut().set_auth_method(method);
            }
            GitAction::SetRemote => {
                let remotes = query(ctx, git().flag("remote")).await?;
                if remotes.is_empty() {
                    ctx.console().warn("No remotes configured")?;
                } else {
                    ctx.console().say(format!("Remotes: {}", remotes.join(", ")))?;
                }
                let current = active_remote(ctx);
                let chosen = ctx.console().prompt_default("Remote", &current).await?;
                if !remotes.is_empty() && !remotes.contains(&chosen) {
                    ctx.console()
                        .warn(format!("{} is not a configured remote", chosen))?;
                }
                ctx.console().success(format!("Using remote {}", chosen))?;
                ctx.session_mut().set_remote(chosen);
            }
        }
        Ok(())
    }
}
