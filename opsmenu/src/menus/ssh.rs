//! SSH key menu: key generation and the ssh agent

use async_trait::async_trait;
use opsmenu_core::{CommandInvocation, OpsMenuError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::gate::Gate;
use crate::menu::{Action, ActionContext, Menu, MenuItem};

/// Socket variable ssh-add uses to reach the agent
pub const SSH_AUTH_SOCK: &str = "SSH_AUTH_SOCK";

#[derive(Debug, Clone, Copy)]
enum SshAction {
    Generate,
    AddToAgent,
    ListAgent,
    ShowPublic,
    ClearAgent,
}

pub fn menu() -> Menu {
    Menu::new(
        "SSH Keys",
        vec![
            MenuItem::new("Generate Key", SshAction::Generate),
            MenuItem::new("Add Key to Agent", SshAction::AddToAgent),
            MenuItem::new("List Agent Keys", SshAction::ListAgent),
            MenuItem::new("Show Public Key", SshAction::ShowPublic),
            MenuItem::destructive("Remove All Agent Keys", SshAction::ClearAgent),
        ],
    )
}

fn default_key(ctx: &ActionContext<'_>) -> PathBuf {
    let ssh = &ctx.settings().ssh;
    ssh.key_dir.join(format!("id_{}", ssh.key_type))
}

fn public_key_path(key: &Path) -> PathBuf {
    let mut name = key.as_os_str().to_owned();
    name.push(".pub");
    PathBuf::from(name)
}

/// Ask for a key path, offering the configured default
async fn prompt_key(ctx: &mut ActionContext<'_>, message: &str, default: PathBuf) -> Result<PathBuf> {
    let answer = ctx
        .console()
        .prompt_default(message, &default.display().to_string())
        .await?;
    Ok(ctx.session().resolve(answer))
}

/// Fail unless an agent socket is set in the session or process environment
fn require_agent(ctx: &ActionContext<'_>) -> Result<()> {
    let in_session = ctx.session().env_flags().contains_key(SSH_AUTH_SOCK);
    if in_session || std::env::var_os(SSH_AUTH_SOCK).is_some() {
        Ok(())
    } else {
        Err(OpsMenuError::InvalidInput(format!(
            "{} is not set; start ssh-agent first",
            SSH_AUTH_SOCK
        )))
    }
}

#[async_trait]
impl Action for SshAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        match self {
            SshAction::Generate => {
                let comment = ctx
                    .console()
                    .prompt_required("Key comment (e.g. your email)")
                    .await?;
                let key_type = ctx.settings().ssh.key_type.clone();
                let key_dir = ctx.settings().ssh.key_dir.clone();
                let name = ctx
                    .console()
                    .prompt_default("Key file name", &format!("id_{}", key_type))
                    .await?;
                let path = ctx.session().resolve(key_dir.join(name));

                if path.exists() {
                    ctx.guard();
                    ctx.confirm(&Gate::double(
                        format!("{} already exists. Overwrite it?", path.display()),
                        "The old key is lost for good. Are you sure?",
                    ))
                    .await?;
                    info!("Replacing existing key {}", path.display());
                    let remove = CommandInvocation::new("rm")
                        .flag("-f")
                        .target(path.display().to_string())
                        .target(public_key_path(&path).display().to_string());
                    if !ctx.run(&remove).await?.success() {
                        return Ok(());
                    }
                }

                if let Some(parent) = path.parent().filter(|dir| !dir.is_dir()) {
                    let mkdir = CommandInvocation::new("mkdir")
                        .flags(["-p", "-m", "700"])
                        .target(parent.display().to_string());
                    if !ctx.run(&mkdir).await?.success() {
                        return Ok(());
                    }
                }
                let keygen = CommandInvocation::new("ssh-keygen")
                    .flags(["-t", key_type.as_str(), "-C", comment.as_str(), "-f"])
                    .target(path.display().to_string());
                if ctx.run(&keygen).await?.success() {
                    ctx.console()
                        .success(format!("Key written to {}", path.display()))?;
                }
            }
            SshAction::AddToAgent => {
                require_agent(ctx)?;
                let default = default_key(ctx);
                let key = prompt_key(ctx, "Private key", default).await?;
                if !key.is_file() {
                    return Err(OpsMenuError::InvalidInput(format!(
                        "no key file at {}",
                        key.display()
                    )));
                }
                ctx.run(&CommandInvocation::new("ssh-add").target(key.display().to_string()))
                    .await?;
            }
            SshAction::ListAgent => {
                ctx.run(&CommandInvocation::new("ssh-add").flag("-l")).await?;
            }
            SshAction::ShowPublic => {
                let default = public_key_path(&default_key(ctx));
                let path = prompt_key(ctx, "Public key", default).await?;
                debug!("Reading {}", path.display());
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    OpsMenuError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
                })?;
                ctx.console().say(content.trim_end())?;
            }
            SshAction::ClearAgent => {
                ctx.confirm(&Gate::single("Remove every identity from the ssh agent?"))
                    .await?;
                ctx.run(&CommandInvocation::new("ssh-add").flag("-D")).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuEnv;
    use crate::test_utils::{scripted_console, scripted_env};
    use opsmenu_core::{Outcome, Session, Settings};
    use opsmenu_exec::RecordingRunner;
    use serial_test::serial;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn keys() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_public_key_path() {
        assert_eq!(
            public_key_path(Path::new("/home/me/.ssh/id_ed25519")),
            PathBuf::from("/home/me/.ssh/id_ed25519.pub")
        );
    }

    #[tokio::test]
    async fn test_generate_key() {
        let dir = keys();
        let key_dir = dir.path().join("ssh");
        let (mut env, runner, _out) = scripted_env("1\nme@example.com\n\n6\n", dir.path());
        env.settings.ssh.key_dir = key_dir.clone();

        menu().run(&mut env).await.unwrap();

        let path = key_dir.join("id_ed25519");
        assert_eq!(
            runner.command_lines(),
            vec![
                format!("mkdir -p -m 700 {}", key_dir.display()),
                format!("ssh-keygen -t ed25519 -C me@example.com -f {}", path.display()),
            ]
        );
        // Directory creation goes through the runner too
        assert!(!key_dir.exists());
    }

    #[tokio::test]
    async fn test_overwrite_existing_key_declined_keeps_it() {
        let dir = keys();
        std::fs::write(dir.path().join("id_ed25519"), "old").unwrap();
        let (mut env, runner, out) = scripted_env("1\nme\n\ny\nn\n6\n", dir.path());
        env.settings.ssh.key_dir = dir.path().to_path_buf();

        menu().run(&mut env).await.unwrap();

        assert!(runner.calls().is_empty());
        assert!(dir.path().join("id_ed25519").exists());
        assert!(out.contents().contains("already exists"));
    }

    #[tokio::test]
    async fn test_overwrite_existing_key_confirmed() {
        let dir = keys();
        std::fs::write(dir.path().join("work"), "old").unwrap();
        std::fs::write(dir.path().join("work.pub"), "old").unwrap();
        let (mut env, runner, _out) = scripted_env("1\nme\nwork\ny\ny\n6\n", dir.path());
        env.settings.ssh.key_dir = dir.path().to_path_buf();

        menu().run(&mut env).await.unwrap();

        let key = dir.path().join("work");
        assert_eq!(
            runner.command_lines(),
            vec![
                format!("rm -f {} {}.pub", key.display(), key.display()),
                format!("ssh-keygen -t ed25519 -C me -f {}", key.display()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_removal_skips_keygen() {
        let dir = keys();
        std::fs::write(dir.path().join("id_ed25519"), "old").unwrap();
        let (mut env, runner, _out) = scripted_env("1\nme\n\ny\ny\n6\n", dir.path());
        env.settings.ssh.key_dir = dir.path().to_path_buf();
        runner.queue_outcome(Outcome::Exited(1));

        menu().run(&mut env).await.unwrap();

        assert_eq!(runner.calls().len(), 1);
        assert_eq!(runner.calls()[0].verb, "rm");
    }

    #[tokio::test]
    async fn test_dry_run_overwrite_leaves_keys_on_disk() {
        let dir = keys();
        std::fs::write(dir.path().join("id_ed25519"), "old").unwrap();
        std::fs::write(dir.path().join("id_ed25519.pub"), "old").unwrap();
        let (console, _out) = scripted_console("1\nme\n\ny\ny\n6\n");
        let runner = Arc::new(RecordingRunner::echoing());
        let mut env = MenuEnv::new(
            console,
            runner.clone(),
            Session::new(dir.path()),
            Settings::default(),
        )
        .skip_prerequisite_checks();
        env.settings.ssh.key_dir = dir.path().to_path_buf();

        menu().run(&mut env).await.unwrap();

        assert_eq!(runner.calls().len(), 2);
        assert_eq!(std::fs::read_to_string(dir.path().join("id_ed25519")).unwrap(), "old");
        assert_eq!(std::fs::read_to_string(dir.path().join("id_ed25519.pub")).unwrap(), "old");
    }

    #[tokio::test]
    #[serial]
    async fn test_add_key_requires_agent() {
        let saved = std::env::var_os(SSH_AUTH_SOCK);
        std::env::remove_var(SSH_AUTH_SOCK);

        let dir = keys();
        let (mut env, runner, out) = scripted_env("2\n6\n", dir.path());
        menu().run(&mut env).await.unwrap();

        if let Some(value) = saved {
            std::env::set_var(SSH_AUTH_SOCK, value);
        }
        assert!(runner.calls().is_empty());
        assert!(out.contents().contains("SSH_AUTH_SOCK is not set"));
    }

    #[tokio::test]
    async fn test_add_key_with_session_agent() {
        let dir = keys();
        let key = dir.path().join("id_ed25519");
        std::fs::write(&key, "key").unwrap();
        let (mut env, runner, _out) = scripted_env("2\n\n6\n", dir.path());
        env.settings.ssh.key_dir = dir.path().to_path_buf();
        env.session.set_env_flag(SSH_AUTH_SOCK, "/tmp/agent.sock");

        menu().run(&mut env).await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![format!("ssh-add {}", key.display())]
        );
    }

    #[tokio::test]
    async fn test_relative_key_resolved_in_session_directory() {
        let dir = keys();
        let key = dir.path().join("deploy");
        std::fs::write(&key, "key").unwrap();
        let (mut env, runner, _out) = scripted_env("2\ndeploy\n6\n", dir.path());
        env.session.set_env_flag(SSH_AUTH_SOCK, "/tmp/agent.sock");

        menu().run(&mut env).await.unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![format!("ssh-add {}", key.display())]
        );
    }

    #[tokio::test]
    async fn test_show_public_key() {
        let dir = keys();
        std::fs::write(
            dir.path().join("id_ed25519.pub"),
            "ssh-ed25519 AAAAC3Nza me@example.com\n",
        )
        .unwrap();
        let (mut env, runner, out) = scripted_env("4\n\n6\n", dir.path());
        env.settings.ssh.key_dir = dir.path().to_path_buf();

        menu().run(&mut env).await.unwrap();

        assert!(runner.calls().is_empty());
        assert!(out.contents().contains("ssh-ed25519 AAAAC3Nza me@example.com"));
    }

    #[tokio::test]
    async fn test_show_missing_public_key_is_reported() {
        let dir = keys();
        let (mut env, _runner, out) = scripted_env("4\n\n6\n", dir.path());
        env.settings.ssh.key_dir = dir.path().to_path_buf();

        menu().run(&mut env).await.unwrap();
        assert!(out.contents().contains("cannot read"));
    }

    #[tokio::test]
    async fn test_clear_agent_gated() {
        let dir = keys();
        let (mut env, runner, _out) = scripted_env("5\n\n5\ny\n6\n", dir.path());

        menu().run(&mut env).await.unwrap();
        assert_eq!(runner.command_lines(), vec!["ssh-add -D"]);
    }
}
