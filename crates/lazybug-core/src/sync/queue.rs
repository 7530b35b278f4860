//! Background job queue shared by coordinator runs and item uploads.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Default number of item jobs allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

/// Handle to a tokio runtime with a bound on concurrent item jobs.
///
/// Cloning is cheap; clones share the same permits.
#[derive(Clone, Debug)]
pub struct JobQueue {
    name: Arc<str>,
    handle: Handle,
    permits: Arc<Semaphore>,
}

impl JobQueue {
    /// Queue bound to the runtime this is called from.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn new(name: &str, max_concurrent_jobs: usize) -> Self {
        Self::with_handle(Handle::current(), name, max_concurrent_jobs)
    }

    pub fn with_handle(handle: Handle, name: &str, max_concurrent_jobs: usize) -> Self {
        Self {
            name: Arc::from(name),
            handle,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn a bounded job; it waits for a permit before running `job`.
    pub fn spawn<F>(&self, job: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        self.handle.spawn(async move {
            // The semaphore is never closed, so acquisition only waits.
            let _permit = permits.acquire_owned().await.ok();
            job.await
        })
    }

    /// Spawn a job outside the permit pool.
    ///
    /// Used for coordinator loops, which wait on their own bounded item jobs
    /// and would deadlock a small pool if they held a permit meanwhile.
    pub fn spawn_unbounded<F>(&self, job: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(job)
    }

    /// Permits currently free for bounded jobs.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}
