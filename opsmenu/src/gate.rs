//! Confirmation Gate
//!
//! Yes/no prompts that guard destructive actions. Answers follow the usual
//! shell-script convention: anything starting with `y` or `n` (any case)
//! counts, an empty line takes the default, and anything else re-asks.

use crate::console::Console;
use opsmenu_core::{OpsMenuError, Result};

/// Answer used when the user just presses Enter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    fn as_bool(self) -> bool {
        matches!(self, Answer::Yes)
    }

    fn hint(self) -> &'static str {
        match self {
            Answer::Yes => "[Y/n]",
            Answer::No => "[y/N]",
        }
    }
}

/// Interpret one answer line; `None` means unrecognized.
pub fn interpret(input: &str, default: Answer) -> Option<bool> {
    let answer = input.trim().to_lowercase();
    if answer.is_empty() {
        Some(default.as_bool())
    } else if answer.starts_with('y') {
        Some(true)
    } else if answer.starts_with('n') {
        Some(false)
    } else {
        None
    }
}

/// Ask a yes/no question until it gets a recognizable answer.
///
/// With `max_attempts` set, gives up with [`OpsMenuError::Aborted`] after
/// that many unrecognized answers.
pub async fn confirm(
    console: &mut Console,
    prompt: &str,
    default: Answer,
    max_attempts: Option<u32>,
) -> Result<bool> {
    let mut attempts = 0;
    loop {
        let line = console.prompt(&format!("{} {}", prompt, default.hint())).await?;
        if let Some(answer) = interpret(&line, default) {
            return Ok(answer);
        }

        attempts += 1;
        if max_attempts.is_some_and(|max| attempts >= max) {
            return Err(OpsMenuError::Aborted { attempts });
        }
        console.say("Please answer y or n.")?;
    }
}

/// One or two confirmations guarding a destructive step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// A single question
    Single(String),
    /// Two independent questions, both must be answered yes
    Double(String, String),
}

impl Gate {
    pub fn single(prompt: impl Into<String>) -> Self {
        Gate::Single(prompt.into())
    }

    pub fn double(first: impl Into<String>, second: impl Into<String>) -> Self {
        Gate::Double(first.into(), second.into())
    }

    /// Ask the gate's questions, defaulting to no.
    ///
    /// Stops at the first declined question.
    pub async fn pass(&self, console: &mut Console, max_attempts: Option<u32>) -> Result<bool> {
        match self {
            Gate::Single(prompt) => confirm(console, prompt, Answer::No, max_attempts).await,
            Gate::Double(first, second) => {
                if !confirm(console, first, Answer::No, max_attempts).await? {
                    return Ok(false);
                }
                confirm(console, second, Answer::No, max_attempts).await
            }
        }
    }
}
