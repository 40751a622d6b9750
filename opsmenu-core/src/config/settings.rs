//! Settings loaded once at startup
//!
//! Every section and field has a default, so a partial file (or none at all)
//! is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::default_ssh_dir;
use crate::error::{OpsMenuError, Result};

/// Docker menu settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    /// Shell started by "Open Shell in Container"
    pub shell: String,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

/// Compose menu settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeSettings {
    /// Command prefix, e.g. `["docker-compose"]` or `["docker", "compose"]`
    pub command: Vec<String>,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            command: vec!["docker-compose".to_string()],
        }
    }
}

/// Git menu settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// Remote used until one is picked in the session
    pub remote: String,
    /// Entries shown by "Show Log"
    pub log_count: u32,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            log_count: 15,
        }
    }
}

/// SSH menu settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    /// Directory new keys are written to
    pub key_dir: PathBuf,
    /// `ssh-keygen -t` value
    pub key_type: String,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            key_dir: default_ssh_dir(),
            key_type: "ed25519".to_string(),
        }
    }
}

/// Postgres menu settings
///
/// Unset connection fields are left to psql's own defaults (`PGHOST`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Database administrative statements connect to
    pub maintenance_db: String,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            user: None,
            maintenance_db: "postgres".to_string(),
        }
    }
}

impl PostgresSettings {
    /// `-h/-p/-U` flags for the configured connection
    pub fn connection_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(host) = &self.host {
            flags.extend(["-h".to_string(), host.clone()]);
        }
        if let Some(port) = self.port {
            flags.extend(["-p".to_string(), port.to_string()]);
        }
        if let Some(user) = &self.user {
            flags.extend(["-U".to_string(), user.clone()]);
        }
        flags
    }
}

/// Prompt behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Unrecognized yes/no answers tolerated before aborting.
    ///
    /// `None` keeps asking forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// Settings for all menus.
///
/// Located at `~/.config/opsmenu/config.toml` by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub docker: DockerSettings,
    pub compose: ComposeSettings,
    pub git: GitSettings,
    pub ssh: SshSettings,
    pub postgres: PostgresSettings,
    pub prompt: PromptSettings,
}

impl Settings {
    /// Parse Settings from TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize Settings to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Reject values no menu can work with
    pub fn validate(&self) -> Result<()> {
        if self
            .compose
            .command
            .first()
            .map_or(true, |program| program.trim().is_empty())
        {
            return Err(OpsMenuError::Config(
                "compose.command must name a program".to_string(),
            ));
        }
        if self.docker.shell.trim().is_empty() {
            return Err(OpsMenuError::Config("docker.shell cannot be empty".to_string()));
        }
        if self.git.remote.trim().is_empty() {
            return Err(OpsMenuError::Config("git.remote cannot be empty".to_string()));
        }
        if self.git.log_count == 0 {
            return Err(OpsMenuError::Config(
                "git.log_count must be greater than 0".to_string(),
            ));
        }
        if self.ssh.key_type.trim().is_empty() {
            return Err(OpsMenuError::Config("ssh.key_type cannot be empty".to_string()));
        }
        if self.prompt.max_attempts == Some(0) {
            return Err(OpsMenuError::Config(
                "prompt.max_attempts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
