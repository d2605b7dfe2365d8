//! Feishu Bitable API client.
//!
//! Provides a client for the subset of the Feishu open API that the save
//! pipeline consumes: tenant token exchange, drive media upload, table and
//! field listing, and record creation.
//!
//! ### Protocol notes
//!
//! - **Base URL**: `https://open.feishu.cn/open-apis`
//! - **Authentication**: tenant access token exchanged from app id/secret,
//!   sent as a bearer header; cached in-process with a safety margin.
//! - **Envelope**: every JSON response carries an application-level `code`;
//!   non-zero means failure regardless of the HTTP status.
//! - **Upload**: `drive/v1/medias/upload_all` is multipart form data, all
//!   other endpoints are JSON.

pub mod record;
pub mod schema;
pub mod token;
pub mod upload;

pub use record::SavedRecord;
pub use schema::{FieldMap, ResolvedSchema};
pub use upload::UploadedAsset;

use clipbase_core::Error;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use token::CachedToken;

/// Default base URL for the Feishu open API.
const DEFAULT_BASE_URL: &str = "https://open.feishu.cn/open-apis";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "clipbase/0.1";

/// Bitable API client configuration.
#[derive(Debug, Clone)]
pub struct BitableConfig {
    /// Feishu application id.
    pub app_id: String,
    /// Feishu application secret.
    pub app_secret: String,
    /// Base URL (default: https://open.feishu.cn/open-apis).
    pub base_url: String,
    /// Request timeout, applied per remote call (default: 20s).
    pub timeout: Duration,
    /// User-agent string (default: clipbase/0.x).
    pub user_agent: String,
}

impl Default for BitableConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Application-level JSON envelope shared by all Feishu endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// Feishu Bitable API client.
///
/// Cheap to clone; the token cache is shared between clones.
#[derive(Debug, Clone)]
pub struct BitableClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: BitableConfig,
    pub(crate) token: Arc<Mutex<Option<CachedToken>>>,
}

impl BitableClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BitableConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, token: Arc::new(Mutex::new(None)) })
    }

    /// Build a full endpoint URL from an API path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}
