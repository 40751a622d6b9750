//! Run configuration
//!
//! Combines the settings file, `OPSMENU_*` environment variables and command
//! line flags into one [`RunConfig`].

use anyhow::{bail, Context, Result};
use opsmenu_core::{default_config_path, Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Settings file location override
pub const ENV_CONFIG: &str = "OPSMENU_CONFIG";
pub const ENV_COMPOSE_COMMAND: &str = "OPSMENU_COMPOSE_COMMAND";
pub const ENV_GIT_REMOTE: &str = "OPSMENU_GIT_REMOTE";
pub const ENV_SSH_KEY_DIR: &str = "OPSMENU_SSH_KEY_DIR";
pub const ENV_PG_HOST: &str = "OPSMENU_PG_HOST";
pub const ENV_PG_PORT: &str = "OPSMENU_PG_PORT";
pub const ENV_PG_USER: &str = "OPSMENU_PG_USER";
pub const ENV_MAX_ATTEMPTS: &str = "OPSMENU_MAX_ATTEMPTS";

/// Everything one run of the binary needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Effective menu settings
    pub settings: Settings,

    /// Directory every wrapped command runs in
    pub working_directory: PathBuf,

    /// Settings file that was (or would be) read
    pub config_path: PathBuf,

    /// Debug logging
    pub verbose: bool,

    /// Print commands instead of running them
    pub dry_run: bool,
}

impl RunConfig {
    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`RunConfig`]
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Call the methods in that order; each one overwrites what came before.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    settings: Settings,
    config_path: Option<PathBuf>,
    working_directory: Option<PathBuf>,
    verbose: bool,
    dry_run: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the settings file.
    ///
    /// The path is `explicit`, else `$OPSMENU_CONFIG`, else the default
    /// location. A missing default file means default settings; a missing
    /// file that was asked for is an error. With `load_file` false only the
    /// path is recorded.
    pub fn with_config_file(mut self, explicit: Option<&Path>, load_file: bool) -> Result<Self> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from));
        let path = requested.clone().unwrap_or_else(default_config_path);
        self.config_path = Some(path.clone());

        if !load_file {
            debug!("Skipping settings file");
            return Ok(self);
        }

        if requested.is_none() && !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(self);
        }

        self.settings = Settings::load(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(self)
    }

    /// Apply `OPSMENU_*` environment variables.
    ///
    /// Values that don't parse are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(command) = env_value(ENV_COMPOSE_COMMAND) {
            self.settings.compose.command =
                command.split_whitespace().map(str::to_string).collect();
        }

        if let Some(remote) = env_value(ENV_GIT_REMOTE) {
            self.settings.git.remote = remote;
        }

        if let Some(dir) = env_value(ENV_SSH_KEY_DIR) {
            self.settings.ssh.key_dir = PathBuf::from(dir);
        }

        if let Some(host) = env_value(ENV_PG_HOST) {
            self.settings.postgres.host = Some(host);
        }

        if let Some(port) = env_value(ENV_PG_PORT) {
            match port.parse::<u16>() {
                Ok(port) if port > 0 => self.settings.postgres.port = Some(port),
                _ => warn!("Ignoring {}={}: not a port number", ENV_PG_PORT, port),
            }
        }

        if let Some(user) = env_value(ENV_PG_USER) {
            self.settings.postgres.user = Some(user);
        }

        if let Some(attempts) = env_value(ENV_MAX_ATTEMPTS) {
            match attempts.parse::<u32>() {
                Ok(n) if n > 0 => self.settings.prompt.max_attempts = Some(n),
                _ => warn!(
                    "Ignoring {}={}: expected a positive number",
                    ENV_MAX_ATTEMPTS, attempts
                ),
            }
        }

        self
    }

    /// Set the session working directory (must exist)
    pub fn with_working_directory(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            bail!("Working directory {} is not a directory", dir.display());
        }
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Cannot resolve working directory {}", dir.display()))?;
        self.working_directory = Some(dir);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<RunConfig> {
        self.settings.validate().context("Invalid settings")?;

        let working_directory = match self.working_directory {
            Some(dir) => dir,
            None => std::env::current_dir().context("Cannot read the current directory")?,
        };

        Ok(RunConfig {
            settings: self.settings,
            working_directory,
            config_path: self.config_path.unwrap_or_else(default_config_path),
            verbose: self.verbose,
            dry_run: self.dry_run,
        })
    }
}

/// Trimmed, non-empty value of an environment variable
fn env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
