//! Whole menu sessions driven through the library API
//!
//! Input is scripted and commands go to a recording runner, except where a
//! test needs a real child process.

use anyhow::Result;
use opsmenu::console::Console;
use opsmenu::menu::MenuEnv;
use opsmenu::menus::{self, MenuKind};
use opsmenu_core::{OpsMenuError, Outcome, Session, Settings};
use opsmenu_exec::{CommandRunner, ProcessRunner, RecordingRunner};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Screen(Arc<Mutex<Vec<u8>>>);

impl Screen {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn session(
    input: &str,
    dir: &Path,
    runner: Arc<dyn CommandRunner>,
) -> (MenuEnv, Screen) {
    let screen = Screen::default();
    let console = Console::new(Cursor::new(input.as_bytes().to_vec()), screen.clone());
    let env = MenuEnv::new(console, runner, Session::new(dir), Settings::default())
        .skip_prerequisite_checks();
    (env, screen)
}

fn position(kind: MenuKind, label: &str) -> usize {
    kind.build()
        .items()
        .iter()
        .position(|item| item.label() == label)
        .map(|idx| idx + 1)
        .unwrap()
}

fn back(kind: MenuKind) -> usize {
    kind.build().items().len() + 1
}

#[tokio::test]
async fn test_declined_container_removal_never_runs_rm() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    // Select, container id, no force, decline
    let script = format!(
        "{}\nabc123\n\nn\n{}\n",
        position(MenuKind::Docker, "Remove Container(s)"),
        back(MenuKind::Docker)
    );
    let (mut env, screen) = session(&script, dir.path(), runner.clone());

    menus::enter(MenuKind::Docker, &mut env).await?;

    assert!(runner
        .command_lines()
        .iter()
        .all(|line| !line.starts_with("docker rm")));
    assert!(screen.text().contains("Cancelled"));
    Ok(())
}

#[tokio::test]
async fn test_compose_up_without_compose_file() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    let script = format!(
        "{}\n{}\n",
        position(MenuKind::Compose, "Compose Up"),
        back(MenuKind::Compose)
    );
    let (mut env, screen) = session(&script, dir.path(), runner.clone());

    menus::enter(MenuKind::Compose, &mut env).await?;

    assert!(runner.calls().is_empty());
    assert!(screen.text().contains("No compose file found"));
    // The menu was shown again after the error
    assert_eq!(screen.text().matches("=== Docker Compose ===").count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_exit_127_reported_and_menu_continues() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    runner.queue_outcome(Outcome::Exited(127));
    let status = position(MenuKind::Git, "Status");
    let script = format!("{}\n{}\n{}\n", status, status, back(MenuKind::Git));
    let (mut env, screen) = session(&script, dir.path(), runner.clone());

    menus::enter(MenuKind::Git, &mut env).await?;

    assert!(screen.text().contains("`git status` exited with code 127"));
    assert_eq!(runner.command_lines(), vec!["git status", "git status"]);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_missing_compose_program_reports_127() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("compose.yaml"), "services: {}\n")?;
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::without_interrupts());
    let script = format!(
        "{}\n{}\n",
        position(MenuKind::Compose, "Compose PS"),
        back(MenuKind::Compose)
    );
    let (mut env, screen) = session(&script, dir.path(), runner);
    env.settings.compose.command = vec!["opsmenu-test-no-such-compose".to_string()];

    menus::compose::menu().run(&mut env).await?;

    assert!(screen.text().contains("exited with code 127"));
    Ok(())
}

#[tokio::test]
async fn test_prune_requires_both_confirmations() -> Result<()> {
    let dir = TempDir::new()?;
    let prune = position(MenuKind::Docker, "Prune System");
    let exit = back(MenuKind::Docker);

    // volumes? / first gate / second gate
    for answers in ["\nn\n", "\ny\n\n", "\ny\nn\n", "y\nyes\nnope\n"] {
        let runner = Arc::new(RecordingRunner::new());
        let script = format!("{}\n{}{}\n", prune, answers, exit);
        let (mut env, _screen) = session(&script, dir.path(), runner.clone());
        menus::enter(MenuKind::Docker, &mut env).await?;
        assert!(runner.calls().is_empty(), "answers {:?} ran prune", answers);
    }

    let runner = Arc::new(RecordingRunner::new());
    let script = format!("{}\n\nY\nYes\n{}\n", prune, exit);
    let (mut env, _screen) = session(&script, dir.path(), runner.clone());
    menus::enter(MenuKind::Docker, &mut env).await?;
    assert_eq!(runner.command_lines(), vec!["docker system prune -f"]);
    Ok(())
}

#[tokio::test]
async fn test_bounded_confirmation_aborts_and_returns_to_menu() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    let script = format!(
        "{}\nshop\nmaybe\nperhaps\n{}\n",
        position(MenuKind::Postgres, "Drop Database"),
        back(MenuKind::Postgres)
    );
    let (mut env, screen) = session(&script, dir.path(), runner.clone());
    env.settings.prompt.max_attempts = Some(2);

    menus::enter(MenuKind::Postgres, &mut env).await?;

    assert!(runner.calls().is_empty());
    assert!(screen.text().contains("Aborted after 2 unrecognized answers"));
    Ok(())
}

#[tokio::test]
async fn test_hub_session_keeps_state_between_menus() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    runner.queue_capture("origin\nupstream\n");
    runner.queue_capture("main\n");

    let git = MenuKind::ALL
        .iter()
        .position(|kind| *kind == MenuKind::Git)
        .map(|idx| idx + 1)
        .unwrap();
    let script = format!(
        "{git}\n{remote}\nupstream\n{back}\n{git}\n{pull}\n{back}\n{exit}\n",
        git = git,
        remote = position(MenuKind::Git, "Set Remote"),
        pull = position(MenuKind::Git, "Pull"),
        back = back(MenuKind::Git),
        exit = MenuKind::ALL.len() + 1,
    );
    let (mut env, _screen) = session(&script, dir.path(), runner.clone());

    menus::hub().run(&mut env).await?;

    assert_eq!(env.session.remote(), Some("upstream"));
    assert!(runner
        .command_lines()
        .contains(&"git pull upstream main".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_input_closed_ends_whole_session() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    // Enter docker, then input ends
    let (mut env, _screen) = session("1\n", dir.path(), runner.clone());

    let err = menus::hub().run(&mut env).await.unwrap_err();
    assert!(matches!(err, OpsMenuError::InputClosed));
    assert!(err.ends_session());
    Ok(())
}

#[tokio::test]
async fn test_missing_tool_is_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    let runner = Arc::new(RecordingRunner::new());
    let screen = Screen::default();
    let console = Console::new(Cursor::new(b"4\n".to_vec()), screen.clone());
    let mut settings = Settings::default();
    settings.compose.command = vec!["opsmenu-test-no-such-compose".to_string()];
    // Prerequisite checks stay on
    let mut env = MenuEnv::new(console, runner.clone(), Session::new(dir.path()), settings);

    let err = menus::enter(MenuKind::Compose, &mut env).await.unwrap_err();
    assert!(matches!(err, OpsMenuError::MissingTool(_)));
    assert!(!err.is_recoverable());
    assert!(runner.calls().is_empty());
    Ok(())
}
