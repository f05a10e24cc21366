//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::DifficultyChannel;

/// Environment variable overriding `webhook.url`.
pub const WEBHOOK_URL_ENV: &str = "TRACKWATCH_WEBHOOK_URL";

/// Environment variable overriding `catalog.url`.
pub const CATALOG_URL_ENV: &str = "TRACKWATCH_CATALOG_URL";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Notification sink settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Snapshot persistence settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Polling cadence
    #[serde(default)]
    pub polling: PollingConfig,

    /// Embed rendering settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Serialize this configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Replace endpoints with values from the environment, when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(WEBHOOK_URL_ENV).ok(),
            std::env::var(CATALOG_URL_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, webhook_url: Option<String>, catalog_url: Option<String>) {
        if let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) {
            self.webhook.url = url;
        }
        if let Some(url) = catalog_url.filter(|u| !u.trim().is_empty()) {
            self.catalog.url = url;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        validate_endpoint("catalog.url", &self.catalog.url)?;
        if self.webhook.url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "webhook.url is empty (set it in config.toml or {WEBHOOK_URL_ENV})"
            )));
        }
        validate_endpoint("webhook.url", &self.webhook.url)?;

        if self.catalog.user_agent.trim().is_empty() {
            return Err(AppError::validation("catalog.user_agent is empty"));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(AppError::validation("catalog.timeout_secs must be > 0"));
        }
        if self.webhook.timeout_secs == 0 {
            return Err(AppError::validation("webhook.timeout_secs must be > 0"));
        }
        if self.webhook.max_attempts == 0 {
            return Err(AppError::validation("webhook.max_attempts must be > 0"));
        }
        if self.polling.interval_secs == 0 {
            return Err(AppError::validation("polling.interval_secs must be > 0"));
        }
        if self.storage.snapshot_file.trim().is_empty() {
            return Err(AppError::validation("storage.snapshot_file is empty"));
        }
        if self.display.enabled_channels.is_empty() {
            return Err(AppError::validation(
                "display.enabled_channels must name at least one channel",
            ));
        }
        for (title, offsets) in &self.display.offsets {
            for code in offsets.keys() {
                if DifficultyChannel::from_code(code).is_none() {
                    return Err(AppError::validation(format!(
                        "display.offsets.\"{title}\" has unknown channel '{code}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Full path of the snapshot file inside the storage directory.
    pub fn snapshot_path(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.storage.snapshot_file)
    }
}

fn validate_endpoint(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::validation(format!(
            "{name} must use http or https, got '{other}'"
        ))),
    }
}

/// Catalog retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Endpoint returning the catalog document
    #[serde(default = "defaults::catalog_url")]
    pub url: String,

    /// User-Agent header for catalog requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: defaults::catalog_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook endpoint (usually supplied through the environment)
    #[serde(default)]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Total attempts per payload when rate limited
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay used when a rate-limit response carries no hint
    #[serde(default = "defaults::retry_after_ms")]
    pub default_retry_after_ms: u64,
}

impl WebhookConfig {
    pub fn default_retry_after(&self) -> Duration {
        Duration::from_millis(self.default_retry_after_ms)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: defaults::timeout(),
            max_attempts: defaults::max_attempts(),
            default_retry_after_ms: defaults::retry_after_ms(),
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file name, relative to the storage directory
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
        }
    }
}

/// Polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Pause between the end of one cycle and the start of the next
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Embed rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Channels shown in the difficulty chart
    #[serde(default = "defaults::enabled_channels")]
    pub enabled_channels: Vec<DifficultyChannel>,

    /// Offset applied when a title or channel has no calibration entry
    #[serde(default = "defaults::default_offset")]
    pub default_offset: i64,

    /// Per-title calibration: title -> channel code -> offset
    #[serde(default = "defaults::offsets")]
    pub offsets: BTreeMap<String, BTreeMap<String, i64>>,

    /// Rating code -> description
    #[serde(default = "defaults::ratings")]
    pub ratings: BTreeMap<String, String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled_channels: defaults::enabled_channels(),
            default_offset: defaults::default_offset(),
            offsets: defaults::offsets(),
            ratings: defaults::ratings(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    use crate::models::DifficultyChannel;

    // Catalog defaults
    pub fn catalog_url() -> String {
        "https://fortnitecontent-website-prod07.ol.epicgames.com/content/api/pages/fortnite-game/spark-tracks".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; trackwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Webhook defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_after_ms() -> u64 {
        5000
    }

    // Storage defaults
    pub fn snapshot_file() -> String {
        "spark_tracks.json".into()
    }

    // Polling defaults
    pub fn interval() -> u64 {
        60
    }

    // Display defaults
    pub fn enabled_channels() -> Vec<DifficultyChannel> {
        DifficultyChannel::ALL.to_vec()
    }
    pub fn default_offset() -> i64 {
        1
    }
    pub fn offsets() -> BTreeMap<String, BTreeMap<String, i64>> {
        let table: [(&str, [i64; 7]); 3] = [
            // pb, pd, vl, ba, pg, ds, bd
            ("The Emptiness Machine", [1, 1, 1, 1, 1, 1, 1]),
            ("Faint", [3, 2, 1, 1, 1, 0, 2]),
            ("Gasolina", [4, 1, 1, 1, 1, 1, 1]),
        ];

        table
            .into_iter()
            .map(|(title, values)| {
                let per_channel: BTreeMap<String, i64> = DifficultyChannel::ALL
                    .iter()
                    .zip(values)
                    .map(|(channel, offset)| (channel.code().to_string(), offset))
                    .collect();
                (title.to_string(), per_channel)
            })
            .collect()
    }
    pub fn ratings() -> BTreeMap<String, String> {
        [
            ("E", "Everyone"),
            ("T", "Teen"),
            ("M", "Mature"),
            ("E10+", "Everyone 10+"),
            ("RP", "Rating Pending"),
        ]
        .into_iter()
        .map(|(code, label)| (code.to_string(), label.to_string()))
        .collect()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
