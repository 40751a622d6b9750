//! opsmenu
//!
//! Interactive menus for routine docker, compose, git, ssh and psql work.

use anyhow::Result;
use clap::Parser;
use opsmenu::cli::{generate_completion, handle_config, handle_menu, Cli, Commands};
use opsmenu::config::RunConfig;
use opsmenu::console::Console;
use opsmenu::menu::MenuEnv;
use opsmenu_core::Session;
use opsmenu_exec::{CommandRunner, ProcessRunner, RecordingRunner};
use std::sync::Arc;
use tracing::{debug, info};

// Single-threaded runtime: the process exits explicitly so a stdin read still
// parked on the blocking pool cannot hold up shutdown.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

/// Initialize tracing on stderr; menus own stdout
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn build_config(cli: &Cli) -> Result<RunConfig> {
    // Build configuration using priority chain: defaults → file → env → CLI args
    let mut builder = RunConfig::builder()
        .with_config_file(cli.config.as_deref(), !cli.no_config)?
        .with_env_overrides();

    if let Some(dir) = &cli.directory {
        builder = builder.with_working_directory(dir)?;
    }

    builder
        .with_verbose(cli.verbose)
        .with_dry_run(cli.dry_run)
        .build()
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Commands::Completion { shell }) = &cli.command {
        generate_completion(*shell);
        return Ok(0);
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return Ok(1);
        }
    };
    debug!("Working directory: {}", config.working_directory.display());

    let kind = match cli.command {
        Some(Commands::Config { command }) => {
            handle_config(command, &config)?;
            return Ok(0);
        }
        Some(command) => command.menu(),
        None => None,
    };

    let runner: Arc<dyn CommandRunner> = if config.dry_run {
        info!("Dry run: commands are printed, not executed");
        Arc::new(RecordingRunner::echoing())
    } else {
        Arc::new(ProcessRunner::new())
    };

    let mut env = MenuEnv::new(
        Console::stdio(),
        runner,
        Session::new(config.working_directory.clone()),
        config.settings.clone(),
    );
    if config.dry_run {
        env = env.skip_prerequisite_checks();
    }

    match handle_menu(kind, &mut env).await {
        Ok(()) => Ok(0),
        Err(e) if e.ends_session() => {
            debug!("Session ended: {}", e);
            // Output is best effort once the terminal is gone
            let _ = env.console.say("Bye.");
            Ok(0)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(1)
        }
    }
}
