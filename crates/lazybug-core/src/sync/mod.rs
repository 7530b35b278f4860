//! Outbox synchronization.
//!
//! A [`SyncCoordinator`] fetches every pending record and fans out one
//! [`ItemSyncTask`] per record onto a [`JobQueue`]. A task deletes its record
//! only after the endpoint accepted it, so delivery is at least once.

mod coordinator;
mod queue;
mod task;

pub use coordinator::SyncCoordinator;
pub use queue::{JobQueue, DEFAULT_MAX_CONCURRENT_JOBS};
pub use task::ItemSyncTask;
