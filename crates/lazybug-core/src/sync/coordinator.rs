//! Sync coordinator: one run at a time over the whole outbox.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::models::{FeedbackId, ItemOutcome, ItemResult, SyncReport, SyncRun};
use crate::store::FeedbackStore;
use crate::transport::FeedbackClient;

use super::queue::JobQueue;
use super::task::ItemSyncTask;

#[derive(Debug, Default)]
struct LoopState {
    running: bool,
    rerun_requested: bool,
}

struct Inner {
    store: Arc<dyn FeedbackStore>,
    client: Arc<dyn FeedbackClient>,
    queue: JobQueue,
    run_slot: Arc<tokio::sync::Mutex<()>>,
    loop_state: Mutex<LoopState>,
    cancel: CancellationToken,
}

/// Drains the outbox through the transport.
///
/// Runs never overlap: `run_sync` callers queue on a fair mutex, and
/// `trigger` folds any signals received during a background run into a
/// single follow-up run.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        client: Arc<dyn FeedbackClient>,
        queue: JobQueue,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                client,
                queue,
                run_slot: Arc::new(tokio::sync::Mutex::new(())),
                loop_state: Mutex::new(LoopState::default()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Run one sync pass, waiting for any active run to finish first.
    ///
    /// The pass executes on the queue and holds the run slot until all of its
    /// item tasks have finished. Dropping the returned future only stops
    /// waiting for the report.
    pub async fn run_sync(&self) -> Result<SyncReport> {
        let slot = Arc::clone(&self.inner.run_slot).lock_owned().await;
        let coordinator = self.clone();
        let pass = self.inner.queue.spawn_unbounded(async move {
            let _slot = slot;
            coordinator.drain().await
        });

        pass.await.map_err(|error| {
            if error.is_cancelled() {
                Error::Cancelled
            } else {
                Error::Job(error.to_string())
            }
        })?
    }

    async fn drain(&self) -> Result<SyncReport> {
        if self.inner.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let records = self.inner.store.fetch_unsynced().await?;
        if records.is_empty() {
            tracing::debug!("No pending feedback to sync");
            return Ok(SyncReport::empty());
        }

        let run = SyncRun::start(&records);
        tracing::info!(
            "Sync run {} started for {} feedback item(s) on queue {}",
            run.id,
            records.len(),
            self.inner.queue.name()
        );

        let handles: Vec<(FeedbackId, JoinHandle<ItemResult>)> = records
            .into_iter()
            .map(|record| {
                let id = record.id;
                let task = ItemSyncTask::new(
                    record,
                    Arc::clone(&self.inner.client),
                    Arc::clone(&self.inner.store),
                    self.inner.cancel.clone(),
                );
                (id, self.inner.queue.spawn(task.run()))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let result = handle.await.unwrap_or_else(|error| {
                let outcome = if error.is_cancelled() {
                    ItemOutcome::Cancelled
                } else {
                    ItemOutcome::Aborted(Error::Job(error.to_string()))
                };
                ItemResult { id, outcome }
            });
            results.push(result);
        }

        let report = run.finish(results);
        if report.is_success() {
            tracing::info!(
                "Sync run {} finished: {} synced",
                report.run_id,
                report.synced_count()
            );
        } else {
            tracing::warn!(
                "Sync run {} finished: {} synced, {} failed (first error: {})",
                report.run_id,
                report.synced_count(),
                report.failed_count(),
                report
                    .first_error()
                    .map_or_else(|| "cancelled".to_string(), ToString::to_string)
            );
        }
        Ok(report)
    }

    /// Signal that new feedback is available.
    ///
    /// Starts a background loop and returns its handle, or returns `None`
    /// when a loop is already active; that loop then runs once more.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        {
            let mut state = self.lock_state();
            if state.running {
                state.rerun_requested = true;
                return None;
            }
            state.running = true;
            state.rerun_requested = false;
        }

        let coordinator = self.clone();
        Some(
            self.inner
                .queue
                .spawn_unbounded(async move { coordinator.trigger_loop().await }),
        )
    }

    async fn trigger_loop(self) {
        let mut reset = LoopReset {
            coordinator: self.clone(),
            finished: false,
        };
        loop {
            match self.run_sync().await {
                Ok(_) => {}
                Err(Error::Cancelled) => tracing::debug!("Background sync stopped: cancelled"),
                Err(error) => tracing::warn!("Background sync failed: {}", error),
            }

            if !self.finish_iteration() {
                reset.finished = true;
                break;
            }
        }
    }

    /// Returns true when another run was requested and should start now.
    fn finish_iteration(&self) -> bool {
        let mut state = self.lock_state();
        if state.rerun_requested && !self.inner.cancel.is_cancelled() {
            state.rerun_requested = false;
            return true;
        }
        state.running = false;
        state.rerun_requested = false;
        false
    }

    /// Stop fresh transmissions and deletions. In-flight sends complete.
    pub fn cancel(&self) {
        tracing::info!("Cancelling feedback sync");
        self.inner.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Whether a background loop started by [`Self::trigger`] is active.
    pub fn is_running(&self) -> bool {
        self.lock_state().running
    }

    fn lock_state(&self) -> MutexGuard<'_, LoopState> {
        self.inner
            .loop_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the loop flags when a trigger loop is aborted or unwinds.
struct LoopReset {
    coordinator: SyncCoordinator,
    finished: bool,
}

impl Drop for LoopReset {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = self.coordinator.lock_state();
            state.running = false;
            state.rerun_requested = false;
        }
    }
}
