//! Child process execution for wrapped tools
//!
//! Commands run with inherited stdio so output streams straight to the
//! terminal. Query commands can be captured instead.

use async_trait::async_trait;
use opsmenu_core::{CapturedOutput, CommandInvocation, OpsMenuError, Outcome, Result, EXIT_NOT_FOUND};
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use tokio::process::Command;
use tokio::signal;
use tracing::{debug, warn};

/// Trait for command execution
///
/// This trait lets menus be driven without spawning real tools by swapping in
/// [`RecordingRunner`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command with the terminal attached and wait for it
    async fn run(&self, invocation: &CommandInvocation) -> Result<Outcome>;

    /// Run a query command and collect its output
    async fn capture(&self, invocation: &CommandInvocation) -> Result<CapturedOutput>;
}

/// Runs invocations as real child processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    watch_interrupts: bool,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Create a runner that stops the child when Ctrl+C is pressed
    pub fn new() -> Self {
        Self {
            watch_interrupts: true,
        }
    }

    /// Create a runner that leaves Ctrl+C handling to the caller
    pub fn without_interrupts() -> Self {
        Self {
            watch_interrupts: false,
        }
    }

    fn command(invocation: &CommandInvocation) -> Command {
        let mut command = Command::new(&invocation.verb);
        command.args(invocation.args()).envs(&invocation.env);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }
        command
    }

    fn spawn_error(invocation: &CommandInvocation, source: std::io::Error) -> OpsMenuError {
        OpsMenuError::Spawn {
            program: invocation.verb.clone(),
            source,
        }
    }
}

fn outcome_from(status: ExitStatus) -> Outcome {
    match status.code() {
        Some(code) => Outcome::Exited(code),
        None => Outcome::Signaled,
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<Outcome> {
        debug!("Running: {}", invocation);

        let mut command = Self::command(invocation);
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("`{}` not found", invocation.verb);
                return Ok(Outcome::Exited(EXIT_NOT_FOUND));
            }
            Err(e) => return Err(Self::spawn_error(invocation, e)),
        };

        if !self.watch_interrupts {
            let status = child.wait().await?;
            return Ok(outcome_from(status));
        }

        // The terminal delivers SIGINT to the child's process group as well;
        // killing here covers children that ignore it.
        tokio::select! {
            status = child.wait() => Ok(outcome_from(status?)),
            _ = signal::ctrl_c() => {
                debug!("Ctrl+C while `{}` was running, stopping it", invocation.verb);
                if let Err(e) = child.start_kill() {
                    debug!("Child already gone: {}", e);
                }
                child.wait().await?;
                Ok(Outcome::Interrupted)
            }
        }
    }

    async fn capture(&self, invocation: &CommandInvocation) -> Result<CapturedOutput> {
        debug!("Capturing: {}", invocation);

        let mut command = Self::command(invocation);
        command.stdin(Stdio::null()).kill_on_drop(true);

        match command.output().await {
            Ok(output) => Ok(CapturedOutput {
                outcome: outcome_from(output.status),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(CapturedOutput {
                outcome: Outcome::Exited(EXIT_NOT_FOUND),
                stdout: String::new(),
                stderr: format!("{}: command not found", invocation.verb),
            }),
            Err(e) => Err(Self::spawn_error(invocation, e)),
        }
    }
}

/// Records invocations instead of executing them
///
/// Backs `--dry-run`, where each command is echoed and reported as
/// successful. Outcomes and captured output can be queued to script a
/// session; when the queues are empty every command succeeds with no output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    echo: bool,
    calls: Mutex<Vec<CommandInvocation>>,
    outcomes: Mutex<VecDeque<Outcome>>,
    captures: Mutex<VecDeque<CapturedOutput>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that prints each command it would have run
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Queue the outcome of the next `run`
    pub fn queue_outcome(&self, outcome: Outcome) {
        lock(&self.outcomes).push_back(outcome);
    }

    /// Queue the stdout of the next successful `capture`
    pub fn queue_capture(&self, stdout: impl Into<String>) {
        self.queue_captured(CapturedOutput {
            outcome: Outcome::Exited(0),
            stdout: stdout.into(),
            stderr: String::new(),
        });
    }

    /// Queue the full result of the next `capture`
    pub fn queue_captured(&self, captured: CapturedOutput) {
        lock(&self.captures).push_back(captured);
    }

    /// Every invocation seen so far, `run` and `capture` alike
    pub fn calls(&self) -> Vec<CommandInvocation> {
        lock(&self.calls).clone()
    }

    /// Invocations rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        lock(&self.calls).iter().map(ToString::to_string).collect()
    }

    fn record(&self, invocation: &CommandInvocation) {
        if self.echo {
            println!("[dry-run] {}", invocation);
        }
        lock(&self.calls).push(invocation.clone());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<Outcome> {
        self.record(invocation);
        Ok(lock(&self.outcomes)
            .pop_front()
            .unwrap_or(Outcome::Exited(0)))
    }

    async fn capture(&self, invocation: &CommandInvocation) -> Result<CapturedOutput> {
        self.record(invocation);
        Ok(lock(&self.captures).pop_front().unwrap_or(CapturedOutput {
            outcome: Outcome::Exited(0),
            stdout: String::new(),
            stderr: String::new(),
        }))
    }
}
