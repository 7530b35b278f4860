use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lazybug")]
#[command(about = "Capture feedback offline and deliver it when the collector is reachable")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the outbox database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a feedback in the outbox
    #[command(alias = "add")]
    Capture {
        /// Screenshot file attached to the feedback
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,
        /// Optional metadata blob (defaults to CLI app metadata)
        #[arg(long, value_name = "PATH")]
        meta: Option<PathBuf>,
        /// Keep the feedback queued instead of syncing right away
        #[arg(long)]
        no_sync: bool,
        /// Feedback text (read from stdin when omitted)
        content: Vec<String>,
    },
    /// List feedback waiting for delivery
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deliver every pending feedback
    Sync,
    /// Manage the CLI config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the config file
    Init {
        /// Collection endpoint base URL
        #[arg(long, value_name = "URL")]
        base_url: String,
        /// Reject compressed payloads above this size
        #[arg(long, value_name = "BYTES")]
        max_payload_bytes: Option<usize>,
        /// Uploads allowed to run at once
        #[arg(long, value_name = "N")]
        max_concurrent_uploads: Option<usize>,
        /// Per-request timeout in seconds
        #[arg(long, value_name = "SECS")]
        request_timeout_secs: Option<u64>,
    },
    /// Print the effective config (file, environment and flags combined)
    Show,
}
