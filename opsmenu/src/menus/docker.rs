//! Docker menu: containers and images

use async_trait::async_trait;
use opsmenu_core::{CommandInvocation, Result};

use crate::gate::{Answer, Gate};
use crate::menu::{Action, ActionContext, Menu, MenuItem};

const CONTAINER_TABLE: &str = "table {{.ID}}\t{{.Names}}\t{{.Image}}\t{{.Status}}";
const IMAGE_TABLE: &str = "table {{.ID}}\t{{.Repository}}\t{{.Tag}}\t{{.Size}}";

/// Lines of history shown before following logs
const LOG_TAIL: &str = "100";

#[derive(Debug, Clone, Copy)]
enum DockerAction {
    ListContainers,
    ListImages,
    Start,
    Stop,
    Restart,
    FollowLogs,
    Shell,
    RemoveContainers,
    RemoveImages,
    Prune,
}

pub fn menu() -> Menu {
    Menu::new(
        "Docker",
        vec![
            MenuItem::new("List Containers", DockerAction::ListContainers),
            MenuItem::new("List Images", DockerAction::ListImages),
            MenuItem::new("Start Container(s)", DockerAction::Start),
            MenuItem::new("Stop Container(s)", DockerAction::Stop),
            MenuItem::new("Restart Container(s)", DockerAction::Restart),
            MenuItem::new("Follow Logs", DockerAction::FollowLogs),
            MenuItem::new("Open Shell in Container", DockerAction::Shell),
            MenuItem::destructive("Remove Container(s)", DockerAction::RemoveContainers),
            MenuItem::destructive("Remove Image(s)", DockerAction::RemoveImages),
            MenuItem::destructive("Prune System", DockerAction::Prune),
        ],
    )
}

fn docker() -> CommandInvocation {
    CommandInvocation::new("docker")
}

/// Print a listing before asking which entries to act on
async fn show(ctx: &mut ActionContext<'_>, listing: CommandInvocation) -> Result<()> {
    let captured = ctx.capture(&listing).await?;
    if captured.outcome.success() {
        ctx.console().write_raw(&captured.stdout)?;
    } else {
        ctx.console().warn(format!(
            "`{}` {}: {}",
            listing,
            captured.outcome,
            captured.stderr.trim()
        ))?;
    }
    Ok(())
}

#[async_trait]
impl Action for DockerAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        match self {
            DockerAction::ListContainers => {
                ctx.run(&docker().flags(["ps", "-a"])).await?;
            }
            DockerAction::ListImages => {
                ctx.run(&docker().flag("images")).await?;
            }
            DockerAction::Start | DockerAction::Stop | DockerAction::Restart => {
                let verb = match self {
                    DockerAction::Start => "start",
                    DockerAction::Stop => "stop",
                    _ => "restart",
                };
                let ids = ctx.console().prompt_list("Container name(s) or ID(s)").await?;
                ctx.run(&docker().flag(verb).targets(ids)).await?;
            }
            DockerAction::FollowLogs => {
                let id = ctx.console().prompt_required("Container name or ID").await?;
                ctx.console().say("Following logs, press Ctrl+C to stop.")?;
                ctx.run(&docker().flags(["logs", "-f", "--tail", LOG_TAIL]).target(id))
                    .await?;
            }
            DockerAction::Shell => {
                let id = ctx.console().prompt_required("Container name or ID").await?;
                let shell = ctx.settings().docker.shell.clone();
                ctx.run(&docker().flags(["exec", "-it"]).target(id).target(shell))
                    .await?;
            }
            DockerAction::RemoveContainers => {
                show(ctx, docker().flags(["ps", "-a", "--format", CONTAINER_TABLE])).await?;
                let ids = ctx
                    .console()
                    .prompt_list("Container name(s) or ID(s) to remove")
                    .await?;
                let force = ctx
                    .ask("Force removal of running containers?", Answer::No)
                    .await?;
                ctx.confirm(&Gate::single(format!("Remove {}?", ids.join(", "))))
                    .await?;
                ctx.run(&docker().flag("rm").flag_if(force, "-f").targets(ids))
                    .await?;
            }
            DockerAction::RemoveImages => {
                show(ctx, docker().flags(["images", "--format", IMAGE_TABLE])).await?;
                let ids = ctx
                    .console()
                    .prompt_list("Image name(s) or ID(s) to remove")
                    .await?;
                ctx.confirm(&Gate::single(format!("Remove image(s) {}?", ids.join(", "))))
                    .await?;
                ctx.run(&docker().flag("rmi").targets(ids)).await?;
            }
            DockerAction::Prune => {
                let volumes = ctx
                    .ask("Also remove unused volumes?", Answer::No)
                    .await?;
                let what = if volumes {
                    "stopped containers, unused networks, dangling images, build cache and unused volumes"
                } else {
                    "stopped containers, unused networks, dangling images and build cache"
                };
                ctx.confirm(&Gate::double(
                    format!("This removes all {}. Continue?", what),
                    "This cannot be undone. Are you sure?",
                ))
                .await?;
                ctx.run(
                    &docker()
                        .flags(["system", "prune", "-f"])
                        .flag_if(volumes, "--volumes"),
                )
                .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::scripted_env;
    use opsmenu_core::Outcome;
    use std::path::Path;

    fn item(label: &str) -> usize {
        menu()
            .items()
            .iter()
            .position(|item| item.label() == label)
            .map(|idx| idx + 1)
            .unwrap()
    }

    fn back() -> usize {
        menu().items().len() + 1
    }

    fn non_query(lines: Vec<String>) -> Vec<String> {
        lines
            .into_iter()
            .filter(|line| !line.contains("--format"))
            .collect()
    }

    #[test]
    fn test_destructive_items() {
        let menu = menu();
        let destructive: Vec<&str> = menu
            .items()
            .iter()
            .filter(|item| item.is_destructive())
            .map(|item| item.label())
            .collect();
        assert_eq!(
            destructive,
            vec!["Remove Container(s)", "Remove Image(s)", "Prune System"]
        );
    }

    #[tokio::test]
    async fn test_remove_container_declined_never_runs_rm() {
        let script = format!("{}\nweb\n\nn\n{}\n", item("Remove Container(s)"), back());
        let (mut env, runner, out) = scripted_env(&script, Path::new("/tmp"));
        runner.queue_capture("CONTAINER ID   NAMES\nabc123         web\n");

        menu().run(&mut env).await.unwrap();

        assert!(runner
            .command_lines()
            .iter()
            .all(|line| !line.starts_with("docker rm")));
        assert!(out.contents().contains("abc123"));
        assert!(out.contents().contains("Remove web? [y/N]"));
        assert!(out.contents().contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_remove_containers_confirmed() {
        let script = format!("{}\nweb db\n\ny\n{}\n", item("Remove Container(s)"), back());
        let (mut env, runner, _out) = scripted_env(&script, Path::new("/tmp"));

        menu().run(&mut env).await.unwrap();
        assert_eq!(non_query(runner.command_lines()), vec!["docker rm web db"]);
    }

    #[tokio::test]
    async fn test_remove_containers_forced() {
        let script = format!("{}\nweb\ny\ny\n{}\n", item("Remove Container(s)"), back());
        let (mut env, runner, _out) = scripted_env(&script, Path::new("/tmp"));

        menu().run(&mut env).await.unwrap();
        assert_eq!(non_query(runner.command_lines()), vec!["docker rm -f web"]);
    }

    #[tokio::test]
    async fn test_remove_with_empty_target_reprompts_menu() {
        let script = format!("{}\n\n{}\n", item("Remove Image(s)"), back());
        let (mut env, runner, out) = scripted_env(&script, Path::new("/tmp"));

        menu().run(&mut env).await.unwrap();
        assert!(non_query(runner.command_lines()).is_empty());
        assert!(out.contents().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn test_prune_needs_two_yes() {
        let script = format!("{}\ny\ny\nn\n{}\n", item("Prune System"), back());
        let (mut env, runner, _out) = scripted_env(&script, Path::new("/tmp"));
        menu().run(&mut env).await.unwrap();
        assert!(runner.calls().is_empty());

        let script = format!("{}\ny\ny\ny\n{}\n", item("Prune System"), back());
        let (mut env, runner, _out) = scripted_env(&script, Path::new("/tmp"));
        menu().run(&mut env).await.unwrap();
        assert_eq!(
            runner.command_lines(),
            vec!["docker system prune -f --volumes"]
        );
    }

    #[tokio::test]
    async fn test_stop_multiple_containers() {
        let script = format!("{}\nweb db\n{}\n", item("Stop Container(s)"), back());
        let (mut env, runner, _out) = scripted_env(&script, Path::new("/tmp"));

        menu().run(&mut env).await.unwrap();
        assert_eq!(runner.command_lines(), vec!["docker stop web db"]);
    }

    #[tokio::test]
    async fn test_missing_docker_reports_127_and_continues() {
        let script = format!(
            "{}\n{}\n{}\n",
            item("List Containers"),
            item("List Images"),
            back()
        );
        let (mut env, runner, out) = scripted_env(&script, Path::new("/tmp"));
        runner.queue_outcome(Outcome::Exited(127));

        menu().run(&mut env).await.unwrap();

        assert!(out.contents().contains("`docker ps -a` exited with code 127"));
        assert_eq!(
            runner.command_lines(),
            vec!["docker ps -a", "docker images"]
        );
    }

    #[tokio::test]
    async fn test_shell_uses_configured_shell() {
        let script = format!("{}\nweb\n{}\n", item("Open Shell in Container"), back());
        let (mut env, runner, _out) = scripted_env(&script, Path::new("/tmp"));
        env.settings.docker.shell = "bash".to_string();

        menu().run(&mut env).await.unwrap();
        assert_eq!(runner.command_lines(), vec!["docker exec -it web bash"]);
    }
}
