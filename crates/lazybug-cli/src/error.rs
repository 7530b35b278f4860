use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] lazybug_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No feedback content provided")]
    EmptyContent,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `lazybug config init --base-url <URL>` or set LAZYBUG_BASE_URL."
    )]
    SyncNotConfigured,
    #[error("{failed} feedback item(s) could not be synced; they stay queued for the next sync")]
    SyncIncomplete { failed: usize },
}
