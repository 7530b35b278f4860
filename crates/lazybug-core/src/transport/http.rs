//! HTTP transport for the collection endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::config::LazyBugConfig;
use crate::error::{Error, Result};
use crate::models::FeedbackRecord;
use crate::util::normalize_base_url;

use super::compress::compress_payload;
use super::wire::encode_record;
use super::FeedbackClient;

/// Path appended to the base URL for uploads
pub const FEEDBACKS_PATH: &str = "/feedbacks";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Validate stage: any status in `[200, 300)` is an acknowledgement.
pub fn validate_status(status: u16) -> Result<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(Error::Api { status })
    }
}

/// Uploads feedback with `PUT {base_url}/feedbacks`.
///
/// Every call builds its own payload buffer and request.
#[derive(Debug, Clone)]
pub struct HttpFeedbackClient {
    base_url: String,
    client: reqwest::Client,
    max_payload_bytes: Option<usize>,
}

impl HttpFeedbackClient {
    /// Builds a client for an explicit base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::build(
            &base_url.into(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            None,
        )
    }

    /// Builds a client from the configured endpoint, timeout and payload limit.
    pub fn from_config(config: &LazyBugConfig) -> Result<Self> {
        Self::build(
            &config.require_base_url()?,
            Duration::from_secs(config.request_timeout_secs),
            config.max_payload_bytes,
        )
    }

    fn build(base_url: &str, timeout: Duration, max_payload_bytes: Option<usize>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Config(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self {
            base_url,
            client,
            max_payload_bytes,
        })
    }

    /// Reject compressed payloads larger than `limit` bytes.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full upload URL.
    pub fn endpoint(&self) -> String {
        format!("{}{FEEDBACKS_PATH}", self.base_url)
    }
}

#[async_trait]
impl FeedbackClient for HttpFeedbackClient {
    async fn send_feedback(&self, record: &FeedbackRecord) -> Result<()> {
        let message = encode_record(record)?;
        let payload = compress_payload(&message, self.max_payload_bytes)?;

        let response = self
            .client
            .put(self.endpoint())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, payload.len())
            .body(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        validate_status(status)?;
        tracing::debug!("Feedback {} accepted with HTTP {}", record.id, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries() {
        for status in [200, 250, 299] {
            assert!(validate_status(status).is_ok(), "{status} should pass");
        }
        for status in [199, 300, 304, 404, 500] {
            assert!(
                matches!(validate_status(status), Err(Error::Api { status: s }) if s == status),
                "{status} should fail"
            );
        }
    }

    #[test]
    fn endpoint_joins_feedbacks_path() {
        let client = HttpFeedbackClient::new("https://bugs.example.com/api/").unwrap();
        assert_eq!(client.base_url(), "https://bugs.example.com/api");
        assert_eq!(client.endpoint(), "https://bugs.example.com/api/feedbacks");
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        assert!(matches!(
            HttpFeedbackClient::new("bugs.example.com"),
            Err(Error::Config(_))
        ));
        assert!(matches!(HttpFeedbackClient::new("  "), Err(Error::Config(_))));
    }

    #[test]
    fn from_config_requires_base_url() {
        let config = LazyBugConfig::default();
        assert!(matches!(
            HttpFeedbackClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
