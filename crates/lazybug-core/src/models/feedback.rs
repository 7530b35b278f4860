//! Feedback record model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::util::unix_millis_now;

/// A unique identifier for a feedback record, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedbackId(Uuid);

impl FeedbackId {
    /// Create a new unique feedback ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeedbackId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Payload handed to a store to create a feedback record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    /// Free-form text written by the reporter
    pub content: String,
    /// Encoded screenshot bytes
    pub snapshot: Vec<u8>,
    /// Optional opaque metadata blob
    pub meta: Option<Vec<u8>>,
}

impl NewFeedback {
    pub fn new(content: impl Into<String>, snapshot: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            snapshot: snapshot.into(),
            meta: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<Vec<u8>>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// Assign identity and creation time, rejecting payloads without a snapshot.
    pub fn into_record(self) -> Result<FeedbackRecord> {
        if self.snapshot.is_empty() {
            return Err(Error::InvalidInput(
                "feedback snapshot must not be empty".to_string(),
            ));
        }
        Ok(FeedbackRecord {
            id: FeedbackId::new(),
            content: self.content,
            snapshot: self.snapshot,
            created_at: unix_millis_now(),
            meta: self.meta,
        })
    }
}

/// A persisted feedback record waiting in the outbox.
///
/// Records are immutable: they are either present (unsynced) or deleted
/// after the collection endpoint acknowledged them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Unique identifier
    pub id: FeedbackId,
    /// Reporter text
    pub content: String,
    /// Encoded screenshot bytes
    pub snapshot: Vec<u8>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Optional opaque metadata blob
    pub meta: Option<Vec<u8>>,
}

impl FeedbackRecord {
    /// First line of the content, truncated to `max_len` characters
    #[must_use]
    pub fn content_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }

    /// Creation time as a UTC datetime, if the stored timestamp is representable
    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.created_at)
    }
}
