//! Wire representation of a feedback record

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::FeedbackRecord;

/// Message sent to the collection endpoint, before compression.
///
/// Encoded with `bincode`; strings and byte vectors carry a length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub identifier: String,
    /// RFC 3339 / ISO-8601 timestamp, UTC, second precision
    pub creation_date: String,
    pub content: String,
    pub meta: Option<Vec<u8>>,
    pub snapshot: Vec<u8>,
}

impl WireMessage {
    /// Build the message for `record`.
    ///
    /// A record without snapshot bytes or with an unrepresentable creation
    /// time is incomplete and cannot be sent.
    pub fn from_record(record: &FeedbackRecord) -> Result<Self> {
        if record.snapshot.is_empty() {
            return Err(Error::Serialization(format!(
                "feedback {} has no snapshot",
                record.id
            )));
        }
        let creation_date = format_creation_date(record.created_at).ok_or_else(|| {
            Error::Serialization(format!(
                "feedback {} has an invalid creation time ({})",
                record.id, record.created_at
            ))
        })?;

        Ok(Self {
            identifier: record.id.as_str(),
            creation_date,
            content: record.content.clone(),
            meta: record.meta.clone(),
            snapshot: record.snapshot.clone(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Serialize stage: record to encoded wire bytes.
pub fn encode_record(record: &FeedbackRecord) -> Result<Vec<u8>> {
    WireMessage::from_record(record)?.encode()
}

/// Format Unix milliseconds as `2017-05-10T12:30:00Z`.
pub fn format_creation_date(created_at_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(created_at_ms)
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewFeedback;
    use pretty_assertions::assert_eq;

    fn sample_record() -> FeedbackRecord {
        let mut record = NewFeedback::new("Crash on save", vec![0x89, 0x50, 0x4E, 0x47])
            .with_meta(br#"{"version":"1.0"}"#.to_vec())
            .into_record()
            .unwrap();
        record.created_at = 1_494_419_400_123;
        record
    }

    #[test]
    fn creation_date_is_iso8601_utc() {
        assert_eq!(
            format_creation_date(1_494_419_400_123).as_deref(),
            Some("2017-05-10T12:30:00Z")
        );
        assert_eq!(format_creation_date(0).as_deref(), Some("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn from_record_copies_fields() {
        let record = sample_record();
        let message = WireMessage::from_record(&record).unwrap();

        assert_eq!(message.identifier, record.id.to_string());
        assert_eq!(message.creation_date, "2017-05-10T12:30:00Z");
        assert_eq!(message.content, "Crash on save");
        assert_eq!(message.meta, record.meta);
        assert_eq!(message.snapshot, record.snapshot);
    }

    #[test]
    fn encoded_message_decodes() {
        let record = sample_record();
        let bytes = encode_record(&record).unwrap();
        let decoded = WireMessage::decode(&bytes).unwrap();
        assert_eq!(decoded, WireMessage::from_record(&record).unwrap());
    }

    #[test]
    fn missing_snapshot_is_a_serialization_error() {
        let mut record = sample_record();
        record.snapshot.clear();
        assert!(matches!(
            encode_record(&record),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn out_of_range_timestamp_is_a_serialization_error() {
        let mut record = sample_record();
        record.created_at = i64::MAX;
        assert!(matches!(
            encode_record(&record),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let bytes = encode_record(&sample_record()).unwrap();
        assert!(WireMessage::decode(&bytes[..bytes.len() / 2]).is_err());
    }
}
