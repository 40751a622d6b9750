//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::menus::MenuKind;

/// Interactive menus for docker, compose, git, ssh and psql chores
#[derive(Parser, Debug)]
#[command(name = "opsmenu")]
#[command(version, about = "Interactive menus for docker, compose, git, ssh and psql chores", long_about = None)]
pub struct Cli {
    /// Run commands in this directory instead of the current one
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Config file path (default: ~/.config/opsmenu/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print each command instead of running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Menu to open; without one, a menu of all menus is shown
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
    /// TOML, as written to the config file
    Toml,
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Toml => crate::format::OutputFormat::Toml,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Containers and images
    Docker,

    /// Compose project in the working directory
    Compose,

    /// Branches, commits and remotes
    Git,

    /// SSH keys and the ssh agent
    Ssh,

    /// Databases and users through psql
    Postgres,

    /// Show or create the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// The menu this command opens, if any
    pub fn menu(&self) -> Option<MenuKind> {
        match self {
            Commands::Docker => Some(MenuKind::Docker),
            Commands::Compose => Some(MenuKind::Compose),
            Commands::Git => Some(MenuKind::Git),
            Commands::Ssh => Some(MenuKind::Ssh),
            Commands::Postgres => Some(MenuKind::Postgres),
            Commands::Config { .. } | Commands::Completion { .. } => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the settings file path
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_opens_hub() {
        let cli = Cli::try_parse_from(["opsmenu"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_menu_subcommands() {
        let cli = Cli::try_parse_from(["opsmenu", "-C", "/srv/app", "compose"]).unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("/srv/app")));
        assert_eq!(cli.command.unwrap().menu(), Some(MenuKind::Compose));

        let cli = Cli::try_parse_from(["opsmenu", "postgres", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.command.unwrap().menu(), Some(MenuKind::Postgres));
    }

    #[test]
    fn test_config_show_format() {
        let cli = Cli::try_parse_from(["opsmenu", "config", "show", "--format", "json"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Show { format },
            }) => assert!(matches!(format, OutputFormat::Json)),
            other => panic!("Expected config show, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_menu_rejected() {
        assert!(Cli::try_parse_from(["opsmenu", "kubectl"]).is_err());
    }
}
