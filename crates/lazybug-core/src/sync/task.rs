//! Delivery of a single outbox record.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::models::{FeedbackRecord, ItemOutcome, ItemResult};
use crate::store::FeedbackStore;
use crate::transport::FeedbackClient;

/// Sends one record and, once the endpoint acknowledged it, removes it from
/// the store.
pub struct ItemSyncTask {
    record: FeedbackRecord,
    client: Arc<dyn FeedbackClient>,
    store: Arc<dyn FeedbackStore>,
    cancel: CancellationToken,
}

impl ItemSyncTask {
    pub fn new(
        record: FeedbackRecord,
        client: Arc<dyn FeedbackClient>,
        store: Arc<dyn FeedbackStore>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            record,
            client,
            store,
            cancel,
        }
    }

    pub fn name(&self) -> String {
        format!("feedback-sync.item.{}", self.record.id)
    }

    pub async fn run(self) -> ItemResult {
        let span = tracing::debug_span!("item_sync", task = %self.name());
        let id = self.record.id;
        let outcome = self.deliver().instrument(span).await;
        ItemResult { id, outcome }
    }

    async fn deliver(self) -> ItemOutcome {
        let id = self.record.id;

        if self.cancel.is_cancelled() {
            tracing::debug!("Skipping feedback {}: sync cancelled", id);
            return ItemOutcome::Cancelled;
        }

        if let Err(error) = self.client.send_feedback(&self.record).await {
            tracing::warn!("Failed to send feedback {}: {}", id, error);
            return ItemOutcome::TransmitFailed(error);
        }

        // An in-flight send may finish after cancellation; the record stays
        // queued and is sent again on the next run.
        if self.cancel.is_cancelled() {
            tracing::debug!("Feedback {} sent but sync was cancelled before delete", id);
            return ItemOutcome::Cancelled;
        }

        match self.store.delete(&id).await {
            Ok(()) => {
                tracing::debug!("Feedback {} synced", id);
                ItemOutcome::Synced
            }
            Err(error) => {
                tracing::warn!(
                    "Feedback {} was delivered but could not be removed from the outbox ({}); it will be sent again",
                    id,
                    error
                );
                ItemOutcome::DeleteFailed(error)
            }
        }
    }
}
