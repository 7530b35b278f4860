//! In-memory outbox store

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{FeedbackId, FeedbackRecord, NewFeedback};

use super::FeedbackStore;

#[derive(Default)]
struct MemoryState {
    records: Vec<FeedbackRecord>,
    fail_fetches: bool,
    failing_deletes: HashSet<FeedbackId>,
    fetch_calls: usize,
    delete_calls: usize,
}

/// Store double kept entirely in memory.
///
/// The mutex is the serial context. Failure switches let tests exercise
/// persistence errors without a broken disk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already formed record, keeping its id and timestamp.
    pub async fn seed(&self, record: FeedbackRecord) {
        self.state.lock().await.records.push(record);
    }

    /// Make every subsequent `fetch_unsynced` fail (or succeed again).
    pub async fn fail_fetches(&self, fail: bool) {
        self.state.lock().await.fail_fetches = fail;
    }

    /// Make deletes of `id` fail.
    pub async fn fail_deletes_for(&self, id: FeedbackId) {
        self.state.lock().await.failing_deletes.insert(id);
    }

    /// Snapshot of the stored records, in insertion order.
    pub async fn records(&self) -> Vec<FeedbackRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn ids(&self) -> Vec<FeedbackId> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .map(|record| record.id)
            .collect()
    }

    /// How many times `fetch_unsynced` was called.
    pub async fn fetch_calls(&self) -> usize {
        self.state.lock().await.fetch_calls
    }

    /// How many times `delete` was called.
    pub async fn delete_calls(&self) -> usize {
        self.state.lock().await.delete_calls
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert(&self, feedback: NewFeedback) -> Result<FeedbackRecord> {
        let record = feedback.into_record()?;
        self.state.lock().await.records.push(record.clone());
        Ok(record)
    }

    async fn fetch_unsynced(&self) -> Result<Vec<FeedbackRecord>> {
        let mut state = self.state.lock().await;
        state.fetch_calls += 1;
        if state.fail_fetches {
            return Err(Error::Persistence("fetch disabled".to_string()));
        }
        let mut records = state.records.clone();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn delete(&self, id: &FeedbackId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.delete_calls += 1;
        if state.failing_deletes.contains(id) {
            return Err(Error::Persistence(format!("delete of {id} disabled")));
        }
        state.records.retain(|record| record.id != *id);
        Ok(())
    }
}
