//! Default path resolution for configuration files
//!
//! Uses XDG Base Directory specification when available, with sensible fallbacks.

use std::path::PathBuf;

/// Returns the default path for the settings file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/opsmenu/config.toml`
/// - Fallback: `/etc/opsmenu/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("opsmenu")
        .join("config.toml")
}

/// Returns the directory SSH keys are generated into by default.
///
/// `~/.ssh`, or `.ssh` relative to the working directory when there is no
/// home directory.
pub fn default_ssh_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ssh"))
        .unwrap_or_else(|| PathBuf::from(".ssh"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
        assert!(path.ends_with("opsmenu/config.toml"));
    }

    #[test]
    fn test_default_ssh_dir_ends_with_ssh() {
        assert!(default_ssh_dir().ends_with(".ssh"));
    }
}
