//! Client configuration for the feedback outbox.
//!
//! A single JSON file holds the collection endpoint plus a few tuning knobs.
//! Environment variables override the file so deployments can point an
//! existing install at a different endpoint without editing it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sync::DEFAULT_MAX_CONCURRENT_JOBS;
use crate::util::{normalize_base_url, normalize_text_option};

pub const ENV_BASE_URL: &str = "LAZYBUG_BASE_URL";
pub const ENV_DB_PATH: &str = "LAZYBUG_DB_PATH";

const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = DEFAULT_MAX_CONCURRENT_JOBS;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Outbox and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LazyBugConfig {
    /// Collection endpoint base URL; uploads go to `{base_url}/feedbacks`
    #[serde(default)]
    pub base_url: Option<String>,
    /// Outbox database file; callers pick a platform default when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Item uploads allowed to run at the same time
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,
    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Largest compressed payload accepted for upload; unbounded when unset
    #[serde(default)]
    pub max_payload_bytes: Option<usize>,
}

const fn default_max_concurrent_uploads() -> usize {
    DEFAULT_MAX_CONCURRENT_UPLOADS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for LazyBugConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            database_path: None,
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_payload_bytes: None,
        }
    }
}

impl LazyBugConfig {
    /// Load a config file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {error}",
                path.display()
            ))
        })?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        normalized.validate()?;
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Apply `LAZYBUG_BASE_URL` / `LAZYBUG_DB_PATH` from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = normalize_text_option(lookup(ENV_BASE_URL)) {
            self.base_url = Some(base_url);
        }
        if let Some(db_path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.database_path = Some(PathBuf::from(db_path));
        }
        self
    }

    /// The normalized base URL, or a configuration error when unset or invalid.
    pub fn require_base_url(&self) -> Result<String> {
        let base_url = normalize_text_option(self.base_url.clone()).ok_or_else(|| {
            Error::Config(format!(
                "collection endpoint is not configured (set base_url or {ENV_BASE_URL})"
            ))
        })?;
        normalize_base_url(&base_url)
    }

    pub const fn is_sync_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            normalize_base_url(base_url)?;
        }
        if self.max_concurrent_uploads == 0 {
            return Err(Error::Config(
                "max_concurrent_uploads must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.max_payload_bytes == Some(0) {
            return Err(Error::Config(
                "max_payload_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.base_url = normalize_text_option(self.base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let config = LazyBugConfig::load_from_path(&tmp.path().join("absent.json")).unwrap();
        assert_eq!(config, LazyBugConfig::default());
        assert_eq!(config.max_concurrent_uploads, 4);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn config_roundtrip_normalizes_base_url() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("lazybug").join("config.json");

        let config = LazyBugConfig {
            base_url: Some(" https://bugs.example.com/ ".to_string()),
            max_payload_bytes: Some(1024 * 1024),
            ..LazyBugConfig::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = LazyBugConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("https://bugs.example.com"));
        assert_eq!(loaded.max_payload_bytes, Some(1024 * 1024));
    }

    #[test]
    fn partial_file_uses_field_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "base_url": "http://localhost:8080" }"#).unwrap();

        let loaded = LazyBugConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(loaded.max_concurrent_uploads, 4);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "base_url": "http://localhost", "retries": 3 }"#).unwrap();

        let error = LazyBugConfig::load_from_path(&path).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = LazyBugConfig {
            base_url: Some("https://file.example.com".to_string()),
            ..LazyBugConfig::default()
        }
        .with_overrides(|key| match key {
            ENV_BASE_URL => Some("https://env.example.com".to_string()),
            ENV_DB_PATH => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.base_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn require_base_url_reports_missing_endpoint() {
        let error = LazyBugConfig::default().require_base_url().unwrap_err();
        assert!(error.to_string().contains(ENV_BASE_URL));
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = LazyBugConfig {
            max_concurrent_uploads: 0,
            ..LazyBugConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LazyBugConfig {
            max_payload_bytes: Some(0),
            ..LazyBugConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
