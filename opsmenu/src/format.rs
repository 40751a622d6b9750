//! Output formatting utilities for the CLI
//!
//! Provides colored status lines and table/JSON rendering of settings.

use anyhow::Result;
use colored::*;
use opsmenu_core::Settings;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
    Toml,
}

/// Format a menu title
pub fn format_heading(title: &str) -> String {
    format!("=== {} ===", title).bold().to_string()
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

/// Format warning message
pub fn format_warning(message: &str) -> String {
    format!("{} {}", "!".yellow().bold(), message.yellow())
}

/// Format error message
pub fn format_error(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message.red())
}

fn display_or_unset(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(unset)".dimmed().to_string())
}

/// Format the effective settings
pub fn format_settings(settings: &Settings, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(settings)?),
        OutputFormat::Toml => Ok(settings.to_toml()?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct SettingRow {
                #[tabled(rename = "Setting")]
                key: &'static str,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows = vec![
                SettingRow {
                    key: "docker.shell",
                    value: settings.docker.shell.clone(),
                },
                SettingRow {
                    key: "compose.command",
                    value: settings.compose.command.join(" "),
                },
                SettingRow {
                    key: "git.remote",
                    value: settings.git.remote.clone(),
                },
                SettingRow {
                    key: "git.log_count",
                    value: settings.git.log_count.to_string(),
                },
                SettingRow {
                    key: "ssh.key_dir",
                    value: settings.ssh.key_dir.display().to_string(),
                },
                SettingRow {
                    key: "ssh.key_type",
                    value: settings.ssh.key_type.clone(),
                },
                SettingRow {
                    key: "postgres.host",
                    value: display_or_unset(settings.postgres.host.clone()),
                },
                SettingRow {
                    key: "postgres.port",
                    value: display_or_unset(settings.postgres.port.map(|p| p.to_string())),
                },
                SettingRow {
                    key: "postgres.user",
                    value: display_or_unset(settings.postgres.user.clone()),
                },
                SettingRow {
                    key: "postgres.maintenance_db",
                    value: settings.postgres.maintenance_db.clone(),
                },
                SettingRow {
                    key: "prompt.max_attempts",
                    value: settings
                        .prompt
                        .max_attempts
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "unlimited".to_string()),
                },
            ];

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Settings:".bold(), table))
        }
    }
}
