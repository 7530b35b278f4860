//! Data models for LazyBug

mod feedback;
mod metadata;
mod sync_run;

pub use feedback::{FeedbackId, FeedbackRecord, NewFeedback};
pub use metadata::AppMetadata;
pub use sync_run::{ItemOutcome, ItemResult, SyncReport, SyncRun};
