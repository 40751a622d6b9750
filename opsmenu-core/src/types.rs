//! Invocation and outcome types shared by the runner and the menus

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Exit code reported when the wrapped program cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// A single external command: `verb flags... target...`
///
/// Arguments are kept as a vector and handed to the OS as-is; nothing is
/// ever re-parsed by a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Program to execute (`docker`, `git`, `psql`, ...)
    pub verb: String,
    /// Ordered flags and sub-commands placed before the target
    pub flags: Vec<String>,
    /// Target operands (container ids, branch names, ...)
    pub target: Vec<String>,
    /// Working directory for the child, if different from the session's
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child
    pub env: BTreeMap<String, String>,
}

impl CommandInvocation {
    /// Start building an invocation of `verb`.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            flags: Vec::new(),
            target: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// Build from a command prefix such as `["docker", "compose"]`.
    ///
    /// The first element becomes the verb, the rest leading flags.
    /// Returns `None` for an empty prefix.
    pub fn from_prefix<S: AsRef<str>>(prefix: &[S]) -> Option<Self> {
        let (verb, rest) = prefix.split_first()?;
        Some(Self::new(verb.as_ref()).flags(rest.iter().map(|s| s.as_ref())))
    }

    /// Append one flag
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Append several flags
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Append one flag only when `condition` holds
    pub fn flag_if(self, condition: bool, flag: impl Into<String>) -> Self {
        if condition {
            self.flag(flag)
        } else {
            self
        }
    }

    /// Append one target operand
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target.push(target.into());
        self
    }

    /// Append several target operands
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Set the child's working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add environment variables, overriding existing keys
    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    /// Full argument vector after the verb
    pub fn args(&self) -> Vec<&str> {
        self.flags
            .iter()
            .chain(self.target.iter())
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.verb))?;
        for arg in self.args() {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a word so a POSIX shell reads it back as one argument.
pub fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// How a child process finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Exited normally with the given code
    Exited(i32),
    /// Terminated by a signal
    Signaled,
    /// Killed because the user pressed Ctrl+C while it ran
    Interrupted,
}

impl Outcome {
    /// True for a zero exit code
    pub fn success(&self) -> bool {
        matches!(self, Outcome::Exited(0))
    }

    /// Numeric exit code, when there is one
    pub fn code(&self) -> Option<i32> {
        match self {
            Outcome::Exited(code) => Some(*code),
            Outcome::Signaled | Outcome::Interrupted => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Exited(code) => write!(f, "exited with code {}", code),
            Outcome::Signaled => write!(f, "terminated by signal"),
            Outcome::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Output of a query command run with piped stdio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub outcome: Outcome,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Non-empty trimmed stdout lines
    pub fn lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}
