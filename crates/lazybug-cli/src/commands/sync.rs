use lazybug_core::{FeedbackOutbox, LazyBugConfig, SyncReport};

use crate::commands::common::format_timestamp;
use crate::error::CliError;

pub async fn run_sync(config: &LazyBugConfig) -> Result<(), CliError> {
    if !config.is_sync_configured() {
        return Err(CliError::SyncNotConfigured);
    }

    let outbox = FeedbackOutbox::open(config)?;
    let report = outbox.sync_now().await?;
    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::SyncIncomplete {
            failed: report.failed_count(),
        })
    }
}

pub fn print_report(report: &SyncReport) {
    for line in format_report_lines(report) {
        println!("{line}");
    }
}

pub fn format_report_lines(report: &SyncReport) -> Vec<String> {
    if report.is_empty() {
        return vec!["Nothing to sync.".to_string()];
    }

    let mut lines = vec![format!(
        "Synced {} of {} feedback item(s) at {}",
        report.synced_count(),
        report.results.len(),
        format_timestamp(report.finished_at)
    )];
    for result in &report.results {
        if let Some(error) = result.outcome.error() {
            lines.push(format!("  {}: {error}", result.id));
        } else if !result.outcome.is_synced() {
            lines.push(format!("  {}: cancelled", result.id));
        }
    }
    lines
}
