//! Locating wrapped tools on PATH

use opsmenu_core::{OpsMenuError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find `name` on the current PATH
pub fn find_tool(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_tool_in(name, &path_var)
}

/// Find `name` in an explicit PATH-style list of directories
///
/// Names containing a path separator are checked as given.
pub fn find_tool_in(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then_some(candidate);
    }

    std::env::split_paths(path_var)
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

/// Fail with [`OpsMenuError::MissingTool`] for the first tool not on PATH
pub fn require_tools(tools: &[&str]) -> Result<()> {
    for tool in tools {
        match find_tool(tool) {
            Some(path) => debug!("Found {} at {}", tool, path.display()),
            None => return Err(OpsMenuError::MissingTool((*tool).to_string())),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    ["", ".exe", ".cmd", ".bat"]
        .iter()
        .map(|ext| dir.join(format!("{}{}", name, ext)))
        .collect()
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
