use std::path::Path;

use lazybug_core::{AppMetadata, FeedbackStore, LazyBugConfig, NewFeedback};

use crate::commands::common::{open_store, resolve_feedback_content};
use crate::commands::sync::run_sync;
use crate::error::CliError;

const APP_NAME: &str = "lazybug-cli";

pub async fn run_capture(
    content_parts: &[String],
    snapshot_path: &Path,
    meta_path: Option<&Path>,
    no_sync: bool,
    config: &LazyBugConfig,
) -> Result<(), CliError> {
    let feedback = build_feedback(content_parts, snapshot_path, meta_path)?;

    {
        let store = open_store(config)?;
        let record = store.insert(feedback).await?;
        println!("{}", record.id);
    }

    if no_sync {
        return Ok(());
    }
    if !config.is_sync_configured() {
        tracing::warn!("Sync is not configured; feedback stays queued");
        return Ok(());
    }

    run_sync(config).await
}

pub fn build_feedback(
    content_parts: &[String],
    snapshot_path: &Path,
    meta_path: Option<&Path>,
) -> Result<NewFeedback, CliError> {
    let content = resolve_feedback_content(content_parts)?;
    let snapshot = std::fs::read(snapshot_path)?;
    let meta = match meta_path {
        Some(path) => std::fs::read(path)?,
        None => AppMetadata::for_app(APP_NAME, env!("CARGO_PKG_VERSION")).to_meta_bytes()?,
    };

    Ok(NewFeedback::new(content, snapshot).with_meta(meta))
}
