//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CLIPBASE_*)
//! 2. TOML config file (if CLIPBASE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Feishu application credentials plus the destination base.
///
/// All three values are required before any network call is made; a missing
/// value is a configuration error, not a runtime fault.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub base_id: String,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CLIPBASE_*)
/// 2. TOML config file (if CLIPBASE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Feishu application id.
    ///
    /// Set via CLIPBASE_APP_ID environment variable.
    #[serde(default)]
    pub app_id: Option<String>,

    /// Feishu application secret.
    ///
    /// Set via CLIPBASE_APP_SECRET environment variable.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Bitable base (app token) that records are written into.
    ///
    /// Set via CLIPBASE_BASE_ID environment variable.
    #[serde(default)]
    pub base_id: Option<String>,

    /// Base URL for the Feishu open API.
    ///
    /// Set via CLIPBASE_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CLIPBASE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds, applied per remote call.
    ///
    /// Set via CLIPBASE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Path to the SQLite inbox database.
    ///
    /// Set via CLIPBASE_INBOX_DB_PATH environment variable.
    #[serde(default = "default_inbox_db_path")]
    pub inbox_db_path: PathBuf,

    /// Maximum number of items retained in the inbox.
    ///
    /// Set via CLIPBASE_INBOX_MAX_ITEMS environment variable.
    #[serde(default = "default_inbox_max_items")]
    pub inbox_max_items: usize,

    /// Maximum age in hours before an inbox item is evicted.
    ///
    /// Set via CLIPBASE_INBOX_MAX_AGE_HOURS environment variable.
    #[serde(default = "default_inbox_max_age_hours")]
    pub inbox_max_age_hours: i64,

    /// Screenshot encoding expected from the capture source.
    ///
    /// Set via CLIPBASE_SCREENSHOT_FORMAT environment variable.
    #[serde(default = "default_screenshot_format")]
    pub screenshot_format: String,

    /// Screenshot encoding quality (1-100).
    ///
    /// Set via CLIPBASE_SCREENSHOT_QUALITY environment variable.
    #[serde(default = "default_screenshot_quality")]
    pub screenshot_quality: u8,

    /// Minimum decoded screenshot size in bytes for a capture to be valid.
    ///
    /// Set via CLIPBASE_SCREENSHOT_MIN_BYTES environment variable.
    #[serde(default = "default_screenshot_min_bytes")]
    pub screenshot_min_bytes: usize,
}

fn default_api_base_url() -> String {
    "https://open.feishu.cn/open-apis".into()
}

fn default_user_agent() -> String {
    "clipbase/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_inbox_db_path() -> PathBuf {
    PathBuf::from("./clipbase-inbox.sqlite")
}

fn default_inbox_max_items() -> usize {
    500
}

fn default_inbox_max_age_hours() -> i64 {
    24
}

fn default_screenshot_format() -> String {
    "jpeg".into()
}

fn default_screenshot_quality() -> u8 {
    80
}

fn default_screenshot_min_bytes() -> usize {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            base_id: None,
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            inbox_db_path: default_inbox_db_path(),
            inbox_max_items: default_inbox_max_items(),
            inbox_max_age_hours: default_inbox_max_age_hours(),
            screenshot_format: default_screenshot_format(),
            screenshot_quality: default_screenshot_quality(),
            screenshot_min_bytes: default_screenshot_min_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Inbox age limit as a chrono Duration.
    pub fn inbox_max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.inbox_max_age_hours)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CLIPBASE_`
    /// 2. TOML file from `CLIPBASE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CLIPBASE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CLIPBASE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Require the full credential set (deferred validation).
    ///
    /// Checked before the first network call of a save; the save fails with
    /// a configuration error when any value is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent field.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let app_id = self.app_id.clone().filter(|s| !s.is_empty()).ok_or_else(|| ConfigError::Missing {
            field: "app_id".into(),
            hint: "Set CLIPBASE_APP_ID environment variable".into(),
        })?;
        let app_secret = self
            .app_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "app_secret".into(),
                hint: "Set CLIPBASE_APP_SECRET environment variable".into(),
            })?;
        let base_id = self.base_id.clone().filter(|s| !s.is_empty()).ok_or_else(|| ConfigError::Missing {
            field: "base_id".into(),
            hint: "Set CLIPBASE_BASE_ID environment variable".into(),
        })?;

        Ok(Credentials { app_id, app_secret, base_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://open.feishu.cn/open-apis");
        assert_eq!(config.user_agent, "clipbase/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.inbox_db_path, PathBuf::from("./clipbase-inbox.sqlite"));
        assert_eq!(config.inbox_max_items, 500);
        assert_eq!(config.inbox_max_age_hours, 24);
        assert_eq!(config.screenshot_format, "jpeg");
        assert_eq!(config.screenshot_quality, 80);
        assert_eq!(config.screenshot_min_bytes, 100);
        assert!(config.app_id.is_none());
        assert!(config.app_secret.is_none());
        assert!(config.base_id.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_credentials_all_missing() {
        let config = AppConfig::default();
        let result = config.credentials();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "app_id"));
    }

    #[test]
    fn test_credentials_partial() {
        let config = AppConfig {
            app_id: Some("cli_a1b2c3".into()),
            app_secret: Some("secret".into()),
            ..Default::default()
        };
        let result = config.credentials();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "base_id"));
    }

    #[test]
    fn test_credentials_empty_string_counts_as_missing() {
        let config = AppConfig {
            app_id: Some(String::new()),
            app_secret: Some("secret".into()),
            base_id: Some("base".into()),
            ..Default::default()
        };
        let result = config.credentials();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "app_id"));
    }

    #[test]
    fn test_credentials_present() {
        let config = AppConfig {
            app_id: Some("cli_a1b2c3".into()),
            app_secret: Some("secret".into()),
            base_id: Some("bascnXYZ".into()),
            ..Default::default()
        };
        let creds = config.credentials().unwrap();
        assert_eq!(creds.app_id, "cli_a1b2c3");
        assert_eq!(creds.base_id, "bascnXYZ");
    }
}
