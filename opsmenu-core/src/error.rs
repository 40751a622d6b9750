//! Error types for opsmenu

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for menu operations
#[derive(Error, Debug)]
pub enum OpsMenuError {
    /// A wrapped tool is not available on PATH
    #[error("Required tool not found on PATH: {0}")]
    MissingTool(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input typed at a prompt
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No compose file in the working directory
    #[error("No compose file found in {}", .0.display())]
    ComposeFileMissing(PathBuf),

    /// A read-only query a menu action depends on failed
    #[error("`{command}` failed: {message}")]
    QueryFailed { command: String, message: String },

    /// A destructive action tried to run a command without approval
    #[error("Confirmation required before running `{0}`")]
    ConfirmationRequired(String),

    /// The user declined a confirmation gate
    #[error("Cancelled")]
    Declined,

    /// Confirmation prompt exceeded its attempt bound
    #[error("Aborted after {attempts} unrecognized answers")]
    Aborted { attempts: u32 },

    /// The user pressed Ctrl+C while a prompt was waiting
    #[error("Interrupted")]
    Interrupted,

    /// Standard input reached end-of-file
    #[error("Input closed")]
    InputClosed,

    /// A child process could not be started
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OpsMenuError {
    /// Errors the menu loop reports and then keeps going after.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OpsMenuError::InvalidInput(_)
                | OpsMenuError::ComposeFileMissing(_)
                | OpsMenuError::QueryFailed { .. }
                | OpsMenuError::ConfirmationRequired(_)
                | OpsMenuError::Declined
                | OpsMenuError::Aborted { .. }
                | OpsMenuError::Spawn { .. }
        )
    }

    /// Errors that end the interactive session without being a failure.
    pub fn ends_session(&self) -> bool {
        matches!(self, OpsMenuError::Interrupted | OpsMenuError::InputClosed)
    }
}

/// Result type alias for menu operations
pub type Result<T> = std::result::Result<T, OpsMenuError>;

impl From<serde_json::Error> for OpsMenuError {
    fn from(err: serde_json::Error) -> Self {
        OpsMenuError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for OpsMenuError {
    fn from(err: toml::de::Error) -> Self {
        OpsMenuError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for OpsMenuError {
    fn from(err: toml::ser::Error) -> Self {
        OpsMenuError::Serialization(err.to_string())
    }
}
