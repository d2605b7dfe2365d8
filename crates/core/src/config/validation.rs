//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// Credentials are deliberately not checked here; they are validated
    /// lazily by [`AppConfig::credentials`] so that inbox-only commands work
    /// without a configured Feishu app.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `api_base_url` or `user_agent` is empty
    /// - `inbox_max_items` or `inbox_max_age_hours` is 0
    /// - screenshot settings are out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.api_base_url.is_empty() {
            return Err(ConfigError::Invalid { field: "api_base_url".into(), reason: "must not be empty".into() });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "api_base_url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.inbox_max_items == 0 {
            return Err(ConfigError::Invalid {
                field: "inbox_max_items".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.inbox_max_age_hours <= 0 {
            return Err(ConfigError::Invalid {
                field: "inbox_max_age_hours".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if !matches!(self.screenshot_format.as_str(), "jpeg" | "png") {
            return Err(ConfigError::Invalid {
                field: "screenshot_format".into(),
                reason: "must be jpeg or png".into(),
            });
        }
        if !(1..=100).contains(&self.screenshot_quality) {
            return Err(ConfigError::Invalid {
                field: "screenshot_quality".into(),
                reason: "must be between 1 and 100".into(),
            });
        }
        if self.screenshot_min_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "screenshot_min_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
