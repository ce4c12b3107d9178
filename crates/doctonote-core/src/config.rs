//! Runtime configuration.
//!
//! Resolved once at startup (environment or YAML file) and passed into the
//! provider, scheduler and session.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `DOCTONOTE_BACKEND_URL` | Rating backend base URL (default: `http://localhost:3000`) |
//! | `DOCTONOTE_TIMEOUT` | Request timeout in seconds (default: transport default) |
//! | `DOCTONOTE_BATCH_DELAY_MS` | Delay between listing items (default: 100) |
//! | `DOCTONOTE_DEBOUNCE_MS` | Quiet period before a page trigger fires (default: 250) |
//! | `DOCTONOTE_STORE` | Path of the rating store file |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the rating pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Base URL of the rating backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Request timeout in seconds. `None` keeps the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Delay between two items of a listing batch, in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Quiet period for debounced page triggers, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Rating store file. `None` uses the user cache directory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_backend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_batch_delay_ms() -> u64 {
    100
}

fn default_debounce_ms() -> u64 {
    250
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            timeout_secs: None,
            batch_delay_ms: default_batch_delay_ms(),
            debounce_ms: default_debounce_ms(),
            store_path: None,
        }
    }
}

impl RatingConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("DOCTONOTE_BACKEND_URL")
                .unwrap_or_else(|_| default_backend_url()),
            timeout_secs: std::env::var("DOCTONOTE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok()),
            batch_delay_ms: std::env::var("DOCTONOTE_BATCH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_batch_delay_ms),
            debounce_ms: std::env::var("DOCTONOTE_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_debounce_ms),
            store_path: std::env::var("DOCTONOTE_STORE").ok().map(PathBuf::from),
        }
    }

    /// Load config from a YAML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the provider cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                message: format!("backend_url must be an http(s) URL, got {:?}", url),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                message: "timeout_secs must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_batch_delay_ms(mut self, ms: u64) -> Self {
        self.batch_delay_ms = ms;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RatingConfig::default();
        assert_eq!(config.backend_url, "http://localhost:3000");
        assert_eq!(config.batch_delay(), Duration::from_millis(100));
        assert_eq!(config.timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_yaml_with_partial_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doctonote.yaml");
        std::fs::write(&path, "backend_url: https://ratings.example.com\ntimeout_secs: 5\n")
            .unwrap();

        let config = RatingConfig::load(&path).unwrap();
        assert_eq!(config.backend_url, "https://ratings.example.com");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.batch_delay_ms, 100);
    }

    #[test]
    fn test_load_rejects_non_http_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doctonote.yaml");
        std::fs::write(&path, "backend_url: ftp://nope\n").unwrap();

        let err = RatingConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RatingConfig::load(Path::new("/nonexistent/doctonote.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_builders() {
        let config = RatingConfig::default()
            .with_backend_url("http://127.0.0.1:9999")
            .with_batch_delay_ms(0)
            .with_store_path("/tmp/ratings.json");
        assert_eq!(config.backend_url, "http://127.0.0.1:9999");
        assert_eq!(config.batch_delay(), Duration::ZERO);
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/ratings.json")));
    }
}
