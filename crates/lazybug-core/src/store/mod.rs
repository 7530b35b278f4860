//! Outbox storage abstraction consumed by the sync pipeline.
//!
//! Every implementation runs its operations on a private serial context, so
//! concurrent item tasks never interleave writes.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FeedbackId, FeedbackRecord, NewFeedback};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable table of unsynced feedback records
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persist a new record, assigning its identifier and creation time
    async fn insert(&self, feedback: NewFeedback) -> Result<FeedbackRecord>;

    /// Every record currently present, oldest first
    async fn fetch_unsynced(&self) -> Result<Vec<FeedbackRecord>>;

    /// Remove exactly one record; deleting an absent id succeeds
    async fn delete(&self, id: &FeedbackId) -> Result<()>;

    /// Number of records waiting for delivery
    async fn count_unsynced(&self) -> Result<usize> {
        Ok(self.fetch_unsynced().await?.len())
    }
}
