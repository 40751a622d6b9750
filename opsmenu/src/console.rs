//! Line-oriented terminal I/O for the menus
//!
//! Input is read a line at a time. When attached to the real terminal,
//! Ctrl+C while waiting for a line ends the read with
//! [`OpsMenuError::Interrupted`].

use colored::Colorize;
use opsmenu_core::{OpsMenuError, Result};
use std::fmt::Display;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::debug;

/// Prompt input and menu output
pub struct Console {
    input: Box<dyn AsyncBufRead + Unpin + Send>,
    output: Box<dyn Write + Send>,
    watch_interrupts: bool,
}

impl Console {
    /// Console over arbitrary streams, without Ctrl+C handling
    pub fn new(
        input: impl AsyncBufRead + Unpin + Send + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            watch_interrupts: false,
        }
    }

    /// Console over the process's stdin/stdout
    pub fn stdio() -> Self {
        Self {
            input: Box::new(BufReader::new(tokio::io::stdin())),
            output: Box::new(std::io::stdout()),
            watch_interrupts: true,
        }
    }

    /// Read one line without its line ending
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();

        let read = if self.watch_interrupts {
            tokio::select! {
                read = self.input.read_line(&mut line) => read?,
                _ = signal::ctrl_c() => {
                    // Leave the ^C on its own line
                    writeln!(self.output)?;
                    return Err(OpsMenuError::Interrupted);
                }
            }
        } else {
            self.input.read_line(&mut line).await?
        };

        if read == 0 {
            debug!("Input closed");
            return Err(OpsMenuError::InputClosed);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(trimmed.to_string())
    }

    /// Print `message: ` and read the trimmed answer
    pub async fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}: ", message)?;
        self.output.flush()?;
        Ok(self.read_line().await?.trim().to_string())
    }

    /// Prompt with a value used when the answer is empty
    pub async fn prompt_default(&mut self, message: &str, default: &str) -> Result<String> {
        let answer = self
            .prompt(&format!("{} [{}]", message, default.dimmed()))
            .await?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    /// Prompt for a value that must not be empty
    pub async fn prompt_required(&mut self, message: &str) -> Result<String> {
        let answer = self.prompt(message).await?;
        if answer.is_empty() {
            return Err(OpsMenuError::InvalidInput(format!(
                "{} cannot be empty",
                message
            )));
        }
        Ok(answer)
    }

    /// Prompt for one or more whitespace-separated values
    pub async fn prompt_list(&mut self, message: &str) -> Result<Vec<String>> {
        let answer = self.prompt_required(message).await?;
        Ok(answer.split_whitespace().map(str::to_string).collect())
    }

    /// Write one line
    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Write raw text with no trailing newline
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    /// Write a warning line
    pub fn warn(&mut self, message: impl Display) -> Result<()> {
        self.say(crate::format::format_warning(&message.to_string()))
    }

    /// Write an error line
    pub fn error(&mut self, message: impl Display) -> Result<()> {
        self.say(crate::format::format_error(&message.to_string()))
    }

    /// Write a success line
    pub fn success(&mut self, message: impl Display) -> Result<()> {
        self.say(crate::format::format_success(&message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::scripted_console;

    #[tokio::test]
    async fn test_read_line_strips_line_endings() {
        let (mut console, _out) = scripted_console("first\r\nsecond\n");
        assert_eq!(console.read_line().await.unwrap(), "first");
        assert_eq!(console.read_line().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_eof_is_input_closed() {
        let (mut console, _out) = scripted_console("");
        assert!(matches!(
            console.read_line().await,
            Err(OpsMenuError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_prompt_writes_message_and_trims() {
        let (mut console, out) = scripted_console("  web  \n");
        assert_eq!(console.prompt("Container").await.unwrap(), "web");
        assert_eq!(out.contents(), "Container: ");
    }

    #[tokio::test]
    async fn test_prompt_default_uses_default_on_empty() {
        let (mut console, _out) = scripted_console("\nupstream\n");
        assert_eq!(
            console.prompt_default("Remote", "origin").await.unwrap(),
            "origin"
        );
        assert_eq!(
            console.prompt_default("Remote", "origin").await.unwrap(),
            "upstream"
        );
    }

    #[tokio::test]
    async fn test_prompt_required_rejects_empty() {
        let (mut console, _out) = scripted_console("   \n");
        let err = console.prompt_required("Branch name").await.unwrap_err();
        match err {
            OpsMenuError::InvalidInput(msg) => assert_eq!(msg, "Branch name cannot be empty"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prompt_list_splits_whitespace() {
        let (mut console, _out) = scripted_console("web  db\tcache\n");
        assert_eq!(
            console.prompt_list("Containers").await.unwrap(),
            vec!["web", "db", "cache"]
        );
    }
}
