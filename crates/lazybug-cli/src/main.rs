//! LazyBug CLI - capture feedback from the terminal and push the outbox
//!
//! Feedback is stored locally first, so capture works offline.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::capture::run_capture;
use crate::commands::common::{load_effective_config, resolve_config_path};
use crate::commands::config::run_config;
use crate::commands::pending::run_pending;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let default_directive: Directive = "lazybug=info"
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);

    match cli.command {
        Commands::Capture {
            snapshot,
            meta,
            no_sync,
            content,
        } => {
            let config = load_effective_config(&config_path, cli.db_path)?;
            run_capture(&content, &snapshot, meta.as_deref(), no_sync, &config).await?;
        }
        Commands::Pending { json } => {
            let config = load_effective_config(&config_path, cli.db_path)?;
            run_pending(json, &config).await?;
        }
        Commands::Sync => {
            let config = load_effective_config(&config_path, cli.db_path)?;
            run_sync(&config).await?;
        }
        Commands::Config { command } => run_config(command, &config_path, cli.db_path)?,
    }

    Ok(())
}
