//! Producer-facing entry point: capture feedback, then let the coordinator
//! deliver it in the background.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::LazyBugConfig;
use crate::error::{Error, Result};
use crate::models::{AppMetadata, FeedbackRecord, NewFeedback, SyncReport};
use crate::store::{FeedbackStore, SqliteStore};
use crate::sync::{JobQueue, SyncCoordinator};
use crate::transport::{FeedbackClient, HttpFeedbackClient};

const QUEUE_NAME: &str = "feedback-sync";

/// Durable feedback outbox wired to a sync coordinator.
#[derive(Clone)]
pub struct FeedbackOutbox {
    store: Arc<dyn FeedbackStore>,
    coordinator: SyncCoordinator,
    metadata: Option<AppMetadata>,
}

impl FeedbackOutbox {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        client: Arc<dyn FeedbackClient>,
        queue: JobQueue,
    ) -> Self {
        let coordinator = SyncCoordinator::new(Arc::clone(&store), client, queue);
        Self {
            store,
            coordinator,
            metadata: None,
        }
    }

    /// Build the `SQLite` store, HTTP client and job queue described by `config`.
    ///
    /// Must be called from within a tokio runtime. Both `database_path` and
    /// `base_url` have to be set.
    pub fn open(config: &LazyBugConfig) -> Result<Self> {
        config.validate()?;
        let database_path = config.database_path.as_ref().ok_or_else(|| {
            Error::Config("database_path is not configured".to_string())
        })?;

        let client = HttpFeedbackClient::from_config(config)?;
        let store = SqliteStore::open(database_path)?;
        let queue = JobQueue::new(QUEUE_NAME, config.max_concurrent_uploads);

        tracing::info!(
            "Feedback outbox ready (endpoint: {}, database: {})",
            client.endpoint(),
            database_path.display()
        );
        Ok(Self::new(Arc::new(store), Arc::new(client), queue))
    }

    /// Attach `metadata` to records submitted through [`Self::submit_feedback`].
    #[must_use]
    pub fn with_metadata(mut self, metadata: AppMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub const fn metadata(&self) -> Option<&AppMetadata> {
        self.metadata.as_ref()
    }

    /// Store a feedback with the default metadata and schedule a sync.
    pub async fn submit_feedback(
        &self,
        content: impl Into<String>,
        snapshot: impl Into<Vec<u8>>,
    ) -> Result<FeedbackRecord> {
        let mut feedback = NewFeedback::new(content, snapshot);
        if let Some(metadata) = &self.metadata {
            feedback = feedback.with_meta(metadata.to_meta_bytes()?);
        }
        self.submit(feedback).await
    }

    /// Store a prepared feedback as-is and schedule a sync.
    pub async fn submit(&self, feedback: NewFeedback) -> Result<FeedbackRecord> {
        let record = self.store.insert(feedback).await?;
        tracing::info!("Captured feedback {}", record.id);
        // Background runs report through the log; callers wanting the
        // outcome use `sync_now`.
        if self.notify_feedback_available().is_some() {
            tracing::debug!("Started background feedback sync");
        }
        Ok(record)
    }

    /// Ask for a background sync. Returns the loop handle if one was started.
    pub fn notify_feedback_available(&self) -> Option<JoinHandle<()>> {
        self.coordinator.trigger()
    }

    /// Run a sync and wait for its report.
    pub async fn sync_now(&self) -> Result<SyncReport> {
        self.coordinator.run_sync().await
    }

    /// Records still waiting for delivery, oldest first.
    pub async fn pending(&self) -> Result<Vec<FeedbackRecord>> {
        self.store.fetch_unsynced().await
    }

    pub async fn pending_count(&self) -> Result<usize> {
        self.store.count_unsynced().await
    }

    pub const fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// Stop syncing. Records not yet delivered stay in the store.
    pub fn shutdown(&self) {
        self.coordinator.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct CollectingClient {
        received: Mutex<Vec<FeedbackRecord>>,
    }

    #[async_trait]
    impl FeedbackClient for CollectingClient {
        async fn send_feedback(&self, record: &FeedbackRecord) -> Result<()> {
            self.received.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn outbox() -> (FeedbackOutbox, Arc<MemoryStore>, Arc<CollectingClient>) {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(CollectingClient::default());
        let outbox = FeedbackOutbox::new(
            store.clone(),
            client.clone(),
            JobQueue::new("test", 2),
        );
        (outbox, store, client)
    }

    #[tokio::test]
    async fn submit_feedback_attaches_metadata_and_syncs() {
        let (outbox, store, client) = outbox();
        let outbox = outbox.with_metadata(AppMetadata::for_app("Demo", "1.2.0"));
        assert_eq!(
            outbox.metadata().and_then(|meta| meta.version.as_deref()),
            Some("1.2.0")
        );

        let record = outbox
            .submit_feedback("Crash on launch", vec![0x89, 0x50])
            .await
            .unwrap();
        assert_eq!(outbox.pending_count().await.unwrap(), 1);

        // The submit above started the background loop; a new signal
        // would only mark a rerun, so wait for the run directly.
        outbox.sync_now().await.unwrap();
        while outbox.coordinator().is_running() {
            tokio::task::yield_now().await;
        }

        let received = client.received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, record.id);
        let meta = AppMetadata::from_meta_bytes(received[0].meta.as_deref().unwrap()).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Demo"));
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn submit_keeps_caller_meta() {
        let (outbox, _store, _client) = outbox();
        let record = outbox
            .submit(NewFeedback::new("Layout glitch", vec![1]).with_meta(b"raw".to_vec()))
            .await
            .unwrap();
        assert_eq!(record.meta.as_deref(), Some(&b"raw"[..]));
    }

    #[tokio::test]
    async fn notify_returns_loop_handle() {
        let (outbox, store, client) = outbox();
        store
            .insert(NewFeedback::new("Queued earlier", vec![1]))
            .await
            .unwrap();

        outbox.notify_feedback_available().unwrap().await.unwrap();

        assert_eq!(client.received.lock().unwrap().len(), 1);
        assert!(outbox.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_snapshot_is_rejected_before_storage() {
        let (outbox, store, _client) = outbox();
        let result = outbox.submit_feedback("No image", Vec::new()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn shutdown_stops_syncing() {
        let (outbox, store, client) = outbox();
        outbox.shutdown();

        outbox
            .submit_feedback("After shutdown", vec![1])
            .await
            .unwrap();
        assert!(matches!(outbox.sync_now().await, Err(Error::Cancelled)));
        while outbox.coordinator().is_running() {
            tokio::task::yield_now().await;
        }

        assert!(client.received.lock().unwrap().is_empty());
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn open_builds_sqlite_backed_outbox() {
        let tmp = tempdir().unwrap();
        let config = LazyBugConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            database_path: Some(tmp.path().join("outbox.db")),
            ..LazyBugConfig::default()
        };

        let outbox = FeedbackOutbox::open(&config).unwrap();
        assert_eq!(outbox.pending_count().await.unwrap(), 0);
        assert!(tmp.path().join("outbox.db").exists());
    }

    #[tokio::test]
    async fn open_requires_database_path_and_endpoint() {
        let config = LazyBugConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            ..LazyBugConfig::default()
        };
        assert!(matches!(
            FeedbackOutbox::open(&config),
            Err(Error::Config(_))
        ));

        let tmp = tempdir().unwrap();
        let config = LazyBugConfig {
            database_path: Some(tmp.path().join("outbox.db")),
            ..LazyBugConfig::default()
        };
        assert!(matches!(
            FeedbackOutbox::open(&config),
            Err(Error::Config(_))
        ));
    }
}
