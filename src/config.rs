//! Guard configuration
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration file.

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the dedup cursor is keyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// One cursor shared by every tab
    #[default]
    Global,
    /// One cursor per tab, bounded to the most recent tab ids
    PerTab,
}

/// Configuration for a `Guard` instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Full URL of the verdict service's check endpoint
    pub verdict_endpoint: String,

    /// Page a tab is sent to after a redirect verdict
    pub landing_url: String,

    /// Delay before the redirect fires, in milliseconds
    pub redirect_delay_ms: u64,

    /// Dedup cursor scope
    pub dedup_scope: DedupScope,

    /// Per-request timeout; `None` keeps the transport default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Location of the persisted protection flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            verdict_endpoint: "http://localhost:5000/check".to_string(),
            landing_url: "https://www.google.com".to_string(),
            redirect_delay_ms: 2000,
            dedup_scope: DedupScope::Global,
            request_timeout_ms: None,
            state_path: None,
        }
    }
}

impl GuardConfig {
    /// Parse and validate a JSON configuration string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: GuardConfig = serde_json::from_str(content)
            .map_err(|e| GuardError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuardError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Check that both URLs are absolute http(s) URLs
    pub fn validate(&self) -> Result<()> {
        validate_http_url("verdict_endpoint", &self.verdict_endpoint)?;
        validate_http_url("landing_url", &self.landing_url)?;
        if self.request_timeout_ms == Some(0) {
            return Err(GuardError::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Configured state path, or `<config dir>/phishguard/state.json`
    pub fn resolved_state_path(&self) -> PathBuf {
        self.state_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("phishguard")
                .join("state.json")
        })
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value).map_err(|e| {
        GuardError::Config(format!("{} '{}' is not a valid URL: {}", field, value, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GuardError::Config(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.verdict_endpoint, "http://localhost:5000/check");
        assert_eq!(config.landing_url, "https://www.google.com");
        assert_eq!(config.redirect_delay(), Duration::from_secs(2));
        assert_eq!(config.dedup_scope, DedupScope::Global);
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = GuardConfig::from_json("{}").unwrap();
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = GuardConfig::from_json(
            r#"{"dedup_scope": "per_tab", "redirect_delay_ms": 500, "request_timeout_ms": 3000}"#,
        )
        .unwrap();
        assert_eq!(config.dedup_scope, DedupScope::PerTab);
        assert_eq!(config.redirect_delay(), Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(config.landing_url, "https://www.google.com");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = GuardConfig::from_json(r#"{"verdict_endpoint": "not a url"}"#).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));

        let err = GuardConfig::from_json(r#"{"landing_url": "ftp://example.com"}"#).unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(GuardConfig::from_json(r#"{"request_timeout_ms": 0}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishguard.json");
        std::fs::write(&path, r#"{"landing_url": "https://safe.example.org"}"#).unwrap();

        let config = GuardConfig::from_file(&path).unwrap();
        assert_eq!(config.landing_url, "https://safe.example.org");
    }

    #[test]
    fn test_from_missing_file() {
        let err = GuardConfig::from_file("/nonexistent/phishguard.json").unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_resolved_state_path_override() {
        let config = GuardConfig {
            state_path: Some(PathBuf::from("/tmp/pg/state.json")),
            ..Default::default()
        };
        assert_eq!(config.resolved_state_path(), PathBuf::from("/tmp/pg/state.json"));
        assert!(GuardConfig::default()
            .resolved_state_path()
            .ends_with("phishguard/state.json"));
    }
}
