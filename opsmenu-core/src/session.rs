//! Per-run session state
//!
//! Created once at startup and passed explicitly to every action. Nothing
//! here is persisted across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::types::{quote, CommandInvocation};

/// How git talks to the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    /// Use a specific private key via `GIT_SSH_COMMAND`
    Ssh { key: PathBuf },
    /// Leave authentication to the configured git credential helper
    Https,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Ssh { key } => write!(f, "SSH ({})", key.display()),
            AuthMethod::Https => write!(f, "HTTPS"),
        }
    }
}

/// Environment variable git reads for its ssh command
pub const GIT_SSH_COMMAND: &str = "GIT_SSH_COMMAND";

/// Mutable state shared by all menus during one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    working_directory: PathBuf,
    auth_method: Option<AuthMethod>,
    remote: Option<String>,
    env_flags: BTreeMap<String, String>,
}

impl Session {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            auth_method: None,
            remote: None,
            env_flags: BTreeMap::new(),
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Resolve a user-supplied path against the working directory
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_directory.join(path)
    }

    pub fn auth_method(&self) -> Option<&AuthMethod> {
        self.auth_method.as_ref()
    }

    /// Select the git auth method, updating the child environment to match.
    pub fn set_auth_method(&mut self, method: AuthMethod) {
        match &method {
            AuthMethod::Ssh { key } => {
                self.env_flags.insert(
                    GIT_SSH_COMMAND.to_string(),
                    format!(
                        "ssh -i {} -o IdentitiesOnly=yes",
                        quote(&key.to_string_lossy())
                    ),
                );
            }
            AuthMethod::Https => {
                self.env_flags.remove(GIT_SSH_COMMAND);
            }
        }
        self.auth_method = Some(method);
    }

    /// Cached remote name, if one was chosen this session
    pub fn remote(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    pub fn set_remote(&mut self, remote: impl Into<String>) {
        self.remote = Some(remote.into());
    }

    pub fn env_flags(&self) -> &BTreeMap<String, String> {
        &self.env_flags
    }

    pub fn set_env_flag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_flags.insert(key.into(), value.into());
    }

    /// Bind an invocation to this session's directory and environment.
    ///
    /// Values already set on the invocation win over session values.
    pub fn bind(&self, invocation: CommandInvocation) -> CommandInvocation {
        let mut env = self.env_flags.clone();
        env.extend(invocation.env);
        CommandInvocation {
            cwd: invocation
                .cwd
                .or_else(|| Some(self.working_directory.clone())),
            env,
            ..invocation
        }
    }
}
