//! Configuration types for favlist-dl
//!
//! The pipeline only consumes a [`Config`]; loading, saving and validating the JSON
//! file are provided here for the embedding program.

use crate::error::{Error, Result};
use crate::quality;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the directory (below `download_path`) that receives videos
pub const VIDEOS_DIR_NAME: &str = "videos";

/// HTTP settings for fetching media streams
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every media request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer header sent with every media request (required by the media CDN)
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Upper bound for a whole media request, body included (default: 30 minutes)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Minimum time between two progress reports for one download (default: 5 seconds)
    #[serde(default = "default_progress_interval", with = "duration_serde")]
    pub progress_interval: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: default_referer(),
            timeout: default_request_timeout(),
            progress_interval: default_progress_interval(),
        }
    }
}

/// Retry configuration for transient catalog failures
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Collections (favourites folders) to download
    #[serde(default, alias = "favorite_ids")]
    pub collection_ids: Vec<i64>,

    /// Root download directory (default: "./downloads")
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,

    /// Number of download workers (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Preferred quality label, e.g. "1080p" (default: "1080p")
    #[serde(default = "default_video_quality")]
    pub video_quality: String,

    /// Queue capacity per worker (default: 2)
    #[serde(default = "default_queue_factor")]
    pub queue_factor: usize,

    /// Items requested per collection page (default: 20)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Media request settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Catalog retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection_ids: Vec::new(),
            download_path: default_download_path(),
            max_concurrent: default_max_concurrent(),
            video_quality: default_video_quality(),
            queue_factor: default_queue_factor(),
            page_size: default_page_size(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// If the file does not exist, the default configuration is written there and
    /// returned as-is (unvalidated, since it lists no collections yet). An existing
    /// file is parsed and then passed through [`Config::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            tracing::info!(path = %path.display(), "Created default configuration file");
            return Ok(config);
        }

        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;

        let mut config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Validate the configuration, filling in defaults for blank settings
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no collection is configured or a collection id
    /// is not positive.
    pub fn validate(&mut self) -> Result<()> {
        if self.collection_ids.is_empty() {
            return Err(Error::config(
                "collection_ids",
                "at least one collection id is required",
            ));
        }

        if let Some(id) = self.collection_ids.iter().find(|id| **id <= 0) {
            return Err(Error::config(
                "collection_ids",
                format!("collection id must be greater than 0: {id}"),
            ));
        }

        if self.download_path.as_os_str().is_empty() {
            self.download_path = default_download_path();
        }
        if self.max_concurrent == 0 {
            self.max_concurrent = default_max_concurrent();
        }
        if self.queue_factor == 0 {
            self.queue_factor = default_queue_factor();
        }
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
        if self.video_quality.trim().is_empty() {
            self.video_quality = default_video_quality();
        } else if !quality::is_known_quality(&self.video_quality) {
            tracing::warn!(
                quality = %self.video_quality,
                tier = quality::DEFAULT_QUALITY_TIER,
                "Unknown video quality, using default tier"
            );
        }

        Ok(())
    }

    /// Capacity of the download queue (`max_concurrent * queue_factor`)
    pub fn queue_capacity(&self) -> usize {
        self.max_concurrent.saturating_mul(self.queue_factor)
    }

    /// Directory that receives video files and sidecars
    pub fn videos_dir(&self) -> PathBuf {
        self.download_path.join(VIDEOS_DIR_NAME)
    }
}

fn default_download_path() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_video_quality() -> String {
    "1080p".to_string()
}

fn default_queue_factor() -> usize {
    2
}

fn default_page_size() -> u32 {
    20
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_referer() -> String {
    "https://www.bilibili.com".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_progress_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert!(config.collection_ids.is_empty());
        assert_eq!(config.download_path, PathBuf::from("./downloads"));
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.video_quality, "1080p");
        assert_eq!(config.queue_capacity(), 6);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.http.timeout, Duration::from_secs(1800));
        assert_eq!(config.http.progress_interval, Duration::from_secs(5));
        assert_eq!(config.http.referer, "https://www.bilibili.com");
    }

    #[test]
    fn minimal_json_uses_defaults_and_accepts_legacy_key() {
        let config: Config = serde_json::from_str(r#"{"favorite_ids": [7, 8]}"#).unwrap();
        assert_eq!(config.collection_ids, vec![7, 8]);
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["http"]["timeout"], 1800);
        assert_eq!(json["retry"]["initial_delay"], 1);
    }

    #[test]
    fn load_missing_file_writes_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists(), "default config should be written to disk");
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            collection_ids: vec![42, 43],
            download_path: dir.path().join("dl"),
            max_concurrent: 5,
            video_quality: "720p".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn validate_requires_collections() {
        let mut config = Config::default();
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("collection_ids")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_non_positive_ids() {
        let mut config = Config {
            collection_ids: vec![1, 0],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn validate_fills_blank_settings() {
        let mut config = Config {
            collection_ids: vec![1],
            download_path: PathBuf::new(),
            max_concurrent: 0,
            video_quality: String::new(),
            queue_factor: 0,
            page_size: 0,
            ..Default::default()
        };
        config.validate().unwrap();

        assert_eq!(config.download_path, PathBuf::from("./downloads"));
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.video_quality, "1080p");
        assert_eq!(config.queue_factor, 2);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn validate_keeps_unknown_quality_label() {
        let mut config = Config {
            collection_ids: vec![1],
            video_quality: "8k".to_string(),
            ..Default::default()
        };
        config.validate().unwrap();
        assert_eq!(config.video_quality, "8k");
    }

    #[test]
    fn videos_dir_is_below_download_path() {
        let config = Config {
            download_path: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(config.videos_dir(), PathBuf::from("/data/videos"));
    }
}
