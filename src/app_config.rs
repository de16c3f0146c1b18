use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Handle of the origin account to poll (without the @)
    pub artist_handle: String,

    /// Dry-run mode: assemble and validate publishes without network calls
    #[serde(default)]
    pub test_mode: bool,

    /// Origin read source credentials and settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Translation provider settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Publish target credentials and settings
    #[serde(default)]
    pub weibo: WeiboConfig,

    /// Fetch cache time-to-live in minutes
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: i64,

    /// Mode switching policy for the primary read channel
    #[serde(default)]
    pub api_switch: ApiSwitchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Credentials and settings for the origin read source
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceConfig {
    /// Bearer token for the authenticated X API v2 channel
    #[serde(default = "String::new")]
    pub bearer_token: String,

    /// API endpoint base URL
    #[serde(default = "default_x_api_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            endpoint: default_x_api_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation provider settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// API key for the primary provider
    #[serde(default = "String::new")]
    pub openai_api_key: String,

    /// Model used by the primary provider
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Primary provider endpoint URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Always route translations through the keyless secondary provider
    #[serde(default)]
    pub use_backup_translator: bool,

    /// Retry count for transient primary failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            model: default_openai_model(),
            endpoint: default_openai_endpoint(),
            use_backup_translator: false,
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Publish target credentials and settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeiboConfig {
    /// Application key
    #[serde(default = "String::new")]
    pub app_key: String,

    /// Application secret
    #[serde(default = "String::new")]
    pub app_secret: String,

    /// OAuth access token
    #[serde(default = "String::new")]
    pub access_token: String,

    /// API endpoint base URL
    #[serde(default = "default_weibo_endpoint")]
    pub endpoint: String,

    /// Retry count for failed publishes
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WeiboConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            access_token: String::new(),
            endpoint: default_weibo_endpoint(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Policy for switching between the primary API and the scraping fallback
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiSwitchConfig {
    /// Whether automatic switching is enabled at all
    #[serde(default = "default_true")]
    pub enable_auto_switch: bool,

    /// Consecutive primary failures before switching to the fallback
    #[serde(default = "default_max_api_failures")]
    pub max_api_failures: u32,

    /// Minutes to wait in fallback mode before probing the primary again
    #[serde(default = "default_api_recovery_minutes")]
    pub api_recovery_minutes: i64,
}

impl Default for ApiSwitchConfig {
    fn default() -> Self {
        Self {
            enable_auto_switch: true,
            max_api_failures: default_max_api_failures(),
            api_recovery_minutes: default_api_recovery_minutes(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_cache_ttl_minutes() -> i64 {
    15
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_true() -> bool {
    true
}

fn default_max_api_failures() -> u32 {
    3
}

fn default_api_recovery_minutes() -> i64 {
    60
}

fn default_x_api_endpoint() -> String {
    "https://api.twitter.com".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_weibo_endpoint() -> String {
    "https://api.weibo.com".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Write the configuration to a JSON file (used to seed a default config)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    ///
    /// Test mode skips credential checks since no network calls are made
    /// to the publish target or, with a default config, to the translator.
    pub fn validate(&self) -> Result<()> {
        if self.artist_handle.is_empty() {
            return Err(anyhow!("An artist handle is required (config or --username)"));
        }

        if self.cache_ttl_minutes < 0 {
            return Err(anyhow!("cache_ttl_minutes must not be negative"));
        }

        if self.api_switch.max_api_failures == 0 {
            return Err(anyhow!("max_api_failures must be at least 1"));
        }

        if self.test_mode {
            return Ok(());
        }

        if self.translation.openai_api_key.is_empty() && !self.translation.use_backup_translator {
            return Err(anyhow!(
                "Translation API key is required unless use_backup_translator is set"
            ));
        }

        if self.weibo.app_key.is_empty() || self.weibo.access_token.is_empty() {
            return Err(anyhow!("Weibo app_key and access_token are required"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            artist_handle: String::new(),
            test_mode: false,
            source: SourceConfig::default(),
            translation: TranslationConfig::default(),
            weibo: WeiboConfig::default(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            api_switch: ApiSwitchConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
