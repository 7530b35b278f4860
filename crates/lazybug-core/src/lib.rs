//! lazybug-core - offline-first feedback outbox
//!
//! Feedback captured in a host application is written to a durable local
//! store first and delivered to a remote collection endpoint later. This
//! crate holds the models, the `SQLite` store, the HTTP transport and the
//! sync pipeline shared by every LazyBug front end.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod outbox;
pub mod store;
pub mod sync;
pub mod transport;
pub mod util;

pub use config::LazyBugConfig;
pub use error::{Error, Result};
pub use models::{AppMetadata, FeedbackId, FeedbackRecord, NewFeedback, SyncReport};
pub use outbox::FeedbackOutbox;
pub use store::{FeedbackStore, MemoryStore, SqliteStore};
pub use sync::{JobQueue, SyncCoordinator};
pub use transport::{FeedbackClient, HttpFeedbackClient};
