//! `SQLite`-backed outbox store running on a dedicated worker thread

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::db::{Database, FeedbackRepository, SqliteFeedbackRepository};
use crate::error::{Error, Result};
use crate::models::{FeedbackId, FeedbackRecord, NewFeedback};

use super::FeedbackStore;

type Job = Box<dyn FnOnce(&Database) + Send>;

const WORKER_THREAD_NAME: &str = "lazybug-store";

/// Store whose connection lives on a single worker thread.
///
/// Operations are queued to the worker and answered through a oneshot
/// channel; the worker runs them one at a time, in submission order.
/// Clones share the same worker, which stops once every clone is dropped.
#[derive(Clone)]
pub struct SqliteStore {
    jobs: mpsc::UnboundedSender<Job>,
}

impl SqliteStore {
    /// Open (or create) the outbox database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let database = Database::open(path)?;
        tracing::debug!(
            "Opened feedback store at {}",
            database
                .path()
                .map_or_else(|| ":memory:".into(), |path| path.display().to_string())
        );
        Self::spawn(database)
    }

    /// Open an in-memory outbox (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::spawn(Database::open_in_memory()?)
    }

    fn spawn(database: Database) -> Result<Self> {
        let (jobs, mut receiver) = mpsc::unbounded_channel::<Job>();
        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    job(&database);
                }
                tracing::debug!("Feedback store worker stopped");
            })?;
        Ok(Self { jobs })
    }

    /// Run `operation` on the worker thread and await its result.
    async fn execute<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&SqliteFeedbackRepository<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job: Job = Box::new(move |database: &Database| {
            let repo = SqliteFeedbackRepository::new(database.connection());
            // The caller may have given up waiting; nothing to do then.
            let _ = reply.send(operation(&repo));
        });

        self.jobs
            .send(job)
            .map_err(|_| Error::Persistence("feedback store worker is not running".to_string()))?;
        response.await.map_err(|_| {
            Error::Persistence("feedback store worker dropped the request".to_string())
        })?
    }
}

#[async_trait]
impl FeedbackStore for SqliteStore {
    async fn insert(&self, feedback: NewFeedback) -> Result<FeedbackRecord> {
        let record = feedback.into_record()?;
        self.execute(move |repo| {
            repo.insert(&record)?;
            Ok(record)
        })
        .await
    }

    async fn fetch_unsynced(&self) -> Result<Vec<FeedbackRecord>> {
        self.execute(|repo| repo.list_unsynced()).await
    }

    async fn delete(&self, id: &FeedbackId) -> Result<()> {
        let id = *id;
        self.execute(move |repo| repo.delete(&id)).await
    }

    async fn count_unsynced(&self) -> Result<usize> {
        self.execute(|repo| repo.count_unsynced()).await
    }
}
