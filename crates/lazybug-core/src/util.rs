//! Shared utility functions used across multiple modules.

use crate::error::{Error, Result};

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Validate a collection endpoint base URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let base_url = normalize_text_option(Some(raw.to_string()))
        .ok_or_else(|| Error::Config("base URL must not be empty".to_string()))?;
    if !is_http_url(&base_url) {
        return Err(Error::Config(format!(
            "base URL must include http:// or https:// (got {base_url})"
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Truncate text to at most `max_chars` characters on a single line.
pub fn compact_text(value: &str, max_chars: usize) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

/// Current Unix timestamp in milliseconds.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
