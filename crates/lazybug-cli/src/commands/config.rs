use std::path::{Path, PathBuf};

use lazybug_core::LazyBugConfig;

use crate::cli::ConfigCommands;
use crate::commands::common::load_effective_config;
use crate::error::CliError;

pub fn run_config(
    command: ConfigCommands,
    config_path: &Path,
    cli_db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            base_url,
            max_payload_bytes,
            max_concurrent_uploads,
            request_timeout_secs,
        } => {
            let config = run_config_init(
                config_path,
                &base_url,
                max_payload_bytes,
                max_concurrent_uploads,
                request_timeout_secs,
            )?;
            println!("Saved config to {}", config_path.display());
            if let Some(base_url) = &config.base_url {
                println!("Feedback will be sent to {base_url}/feedbacks");
            }
            Ok(())
        }
        ConfigCommands::Show => {
            let config = load_effective_config(config_path, cli_db_path)?;
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Update the file at `config_path`, keeping settings not given on the command line.
pub fn run_config_init(
    config_path: &Path,
    base_url: &str,
    max_payload_bytes: Option<usize>,
    max_concurrent_uploads: Option<usize>,
    request_timeout_secs: Option<u64>,
) -> Result<LazyBugConfig, CliError> {
    let mut config = LazyBugConfig::load_from_path(config_path)
        .map_err(|error| CliError::Config(error.to_string()))?;

    config.base_url = Some(base_url.trim().to_string());
    if let Some(limit) = max_payload_bytes {
        config.max_payload_bytes = Some(limit);
    }
    if let Some(uploads) = max_concurrent_uploads {
        config.max_concurrent_uploads = uploads;
    }
    if let Some(timeout) = request_timeout_secs {
        config.request_timeout_secs = timeout;
    }

    config
        .save_to_path(config_path)
        .map_err(|error| CliError::Config(error.to_string()))?;
    LazyBugConfig::load_from_path(config_path).map_err(|error| CliError::Config(error.to_string()))
}
