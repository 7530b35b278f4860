//! Sync run bookkeeping

use uuid::Uuid;

use crate::error::Error;
use crate::util::unix_millis_now;

use super::feedback::{FeedbackId, FeedbackRecord};

/// Terminal state of one item sync task
#[derive(Debug)]
pub enum ItemOutcome {
    /// Delivered and removed from the outbox
    Synced,
    /// Delivery failed; the record is untouched
    TransmitFailed(Error),
    /// Delivered, but the local delete failed; the record will be sent again
    DeleteFailed(Error),
    /// Cancellation was observed before transmitting or deleting
    Cancelled,
    /// The task died before reporting; whether the record was delivered is unknown
    Aborted(Error),
}

impl ItemOutcome {
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::TransmitFailed(error) | Self::DeleteFailed(error) | Self::Aborted(error) => {
                Some(error)
            }
            Self::Synced | Self::Cancelled => None,
        }
    }
}

/// Outcome of a single record within a run
#[derive(Debug)]
pub struct ItemResult {
    pub id: FeedbackId,
    pub outcome: ItemOutcome,
}

/// An in-progress coordinator run: the records it targets, captured at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRun {
    /// Run identifier (UUID v7)
    pub id: Uuid,
    /// Start timestamp (Unix ms)
    pub started_at: i64,
    /// Records processed by this run, in fetch order
    pub targets: Vec<FeedbackId>,
}

impl SyncRun {
    pub fn start(records: &[FeedbackRecord]) -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: unix_millis_now(),
            targets: records.iter().map(|record| record.id).collect(),
        }
    }

    /// Close the run with the results gathered from its tasks.
    pub fn finish(self, results: Vec<ItemResult>) -> SyncReport {
        SyncReport {
            run_id: self.id,
            started_at: self.started_at,
            finished_at: unix_millis_now(),
            results,
        }
    }
}

/// Summary of a finished coordinator run.
///
/// The first error is informational; items complete independently and a
/// failed item never rolls back the others.
#[derive(Debug)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: i64,
    pub finished_at: i64,
    pub results: Vec<ItemResult>,
}

impl SyncReport {
    /// Report for a run that found nothing to sync.
    pub fn empty() -> Self {
        SyncRun::start(&[]).finish(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn synced_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome.is_synced())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.synced_count()
    }

    pub fn first_error(&self) -> Option<&Error> {
        self.results
            .iter()
            .find_map(|result| result.outcome.error())
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn synced_ids(&self) -> Vec<FeedbackId> {
        self.results
            .iter()
            .filter(|result| result.outcome.is_synced())
            .map(|result| result.id)
            .collect()
    }
}
