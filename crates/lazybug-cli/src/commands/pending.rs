use lazybug_core::{FeedbackStore, LazyBugConfig};

use crate::commands::common::{format_pending_lines, open_store, pending_item, PendingItem};
use crate::error::CliError;

pub async fn run_pending(as_json: bool, config: &LazyBugConfig) -> Result<(), CliError> {
    let store = open_store(config)?;
    let records = store.fetch_unsynced().await?;

    if as_json {
        let json_items = records.iter().map(pending_item).collect::<Vec<PendingItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No pending feedback.");
        return Ok(());
    }

    for line in format_pending_lines(&records) {
        println!("{line}");
    }
    Ok(())
}
