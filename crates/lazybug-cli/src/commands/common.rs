use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use chrono::Utc;
use lazybug_core::util::compact_text;
use lazybug_core::{FeedbackRecord, LazyBugConfig, SqliteStore};
use serde::Serialize;

use crate::error::CliError;

const APP_DIR: &str = "lazybug";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "lazybug.db";
const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Serialize)]
pub struct PendingItem {
    pub id: String,
    pub preview: String,
    pub content: String,
    pub created_at: i64,
    pub created_at_iso: String,
    pub relative_time: String,
    pub snapshot_bytes: usize,
    pub has_meta: bool,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DATABASE_FILE)
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path.unwrap_or_else(default_config_path)
}

/// Config file, then `LAZYBUG_*` environment, then `--db-path`.
pub fn load_effective_config(
    config_path: &Path,
    cli_db_path: Option<PathBuf>,
) -> Result<LazyBugConfig, CliError> {
    let config = LazyBugConfig::load_from_path(config_path)
        .map_err(|error| CliError::Config(error.to_string()))?
        .with_env_overrides();
    Ok(apply_db_path(config, cli_db_path))
}

pub fn apply_db_path(mut config: LazyBugConfig, cli_db_path: Option<PathBuf>) -> LazyBugConfig {
    if let Some(path) = cli_db_path {
        config.database_path = Some(path);
    } else if config.database_path.is_none() {
        config.database_path = Some(default_db_path());
    }
    config
}

pub fn database_path(config: &LazyBugConfig) -> PathBuf {
    config.database_path.clone().unwrap_or_else(default_db_path)
}

pub fn open_store(config: &LazyBugConfig) -> Result<SqliteStore, CliError> {
    Ok(SqliteStore::open(database_path(config))?)
}

pub fn pending_item(record: &FeedbackRecord) -> PendingItem {
    PendingItem {
        id: record.id.to_string(),
        preview: compact_text(&record.content, PREVIEW_CHARS),
        content: record.content.clone(),
        created_at: record.created_at,
        created_at_iso: record
            .created_at_utc()
            .map(|date_time| date_time.to_rfc3339())
            .unwrap_or_default(),
        relative_time: format_relative_time(record.created_at, Utc::now().timestamp_millis()),
        snapshot_bytes: record.snapshot.len(),
        has_meta: record.meta.is_some(),
    }
}

pub fn format_pending_lines(records: &[FeedbackRecord]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    records
        .iter()
        .map(|record| {
            let id = record.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let preview = compact_text(&record.content, PREVIEW_CHARS);
            let relative_time = format_relative_time(record.created_at, now_ms);
            format!(
                "{short_id}  {relative_time:>8}  {preview}  [{}]",
                format_size(record.snapshot.len())
            )
        })
        .collect()
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn format_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;

    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{} KiB", bytes / KIB)
    } else {
        format!("{} MiB", bytes / MIB)
    }
}

pub fn resolve_feedback_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}
