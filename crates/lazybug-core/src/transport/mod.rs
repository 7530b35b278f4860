//! Delivery of feedback records to the remote collection endpoint.
//!
//! One call runs four stages in order: serialize the record into a
//! [`WireMessage`], compress it, `PUT` it to `{base_url}/feedbacks`, and
//! validate the response status. The first failing stage ends the call with
//! its own error. Nothing is retried here; a failed record stays in the
//! outbox until the next sync run.

pub mod compress;
mod http;
pub mod wire;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FeedbackRecord;

pub use compress::{compress_payload, decompress_payload};
pub use http::{validate_status, HttpFeedbackClient, FEEDBACKS_PATH};
pub use wire::WireMessage;

/// Capability to deliver one feedback record.
///
/// Implementations hold no mutable state shared across calls.
#[async_trait]
pub trait FeedbackClient: Send + Sync {
    async fn send_feedback(&self, record: &FeedbackRecord) -> Result<()>;
}
