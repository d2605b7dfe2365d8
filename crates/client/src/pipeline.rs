//! The save pipeline: validate, dedupe, then token → upload → schema → write.
//!
//! One pipeline value owns the API client and the inbox handle; there is no
//! process-global state, so tests can inject an in-memory inbox and a mock
//! base URL.
//!
//! Failure policy: the first failing step aborts the save and no automatic
//! retry is attempted. There is no cross-step rollback either — when the
//! record write fails after a successful upload, the uploaded asset stays
//! behind in the drive as an orphan.

use crate::bitable::{BitableClient, BitableConfig, SavedRecord};
use crate::capture::PageCapture;
use clipbase_core::inbox::{InboxDb, InboxItem, InboxLimits};
use clipbase_core::{AppConfig, Error};

/// Outcome of the best-effort inbox write that follows a remote save.
#[derive(Debug, Clone)]
pub enum InboxSync {
    /// The item was mirrored into the local inbox.
    Synced(InboxItem),
    /// The inbox write failed; the remote record is durable regardless.
    Failed(String),
}

/// Result of a save request.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// The record was written remotely; `inbox` reports the local mirror.
    Saved { record: SavedRecord, inbox: InboxSync },
    /// The URL was saved recently; no network call was made.
    Duplicate(InboxItem),
}

/// Orchestrates a single save end to end.
pub struct Pipeline {
    client: BitableClient,
    base_id: String,
    inbox: InboxDb,
    screenshot_min_bytes: usize,
}

impl Pipeline {
    pub fn new(client: BitableClient, base_id: impl Into<String>, inbox: InboxDb, screenshot_min_bytes: usize) -> Self {
        Self { client, base_id: base_id.into(), inbox, screenshot_min_bytes }
    }

    /// Build a pipeline from application configuration.
    ///
    /// Fails with a configuration error when any credential is missing,
    /// before any client is constructed.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let creds = config.credentials()?;

        let client = BitableClient::new(BitableConfig {
            app_id: creds.app_id,
            app_secret: creds.app_secret,
            base_url: config.api_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })?;

        let inbox = InboxDb::open(
            &config.inbox_db_path,
            InboxLimits { max_items: config.inbox_max_items, max_age: config.inbox_max_age() },
        )
        .await?;

        Ok(Self::new(client, creds.base_id, inbox, config.screenshot_min_bytes))
    }

    /// The inbox this pipeline mirrors saves into.
    pub fn inbox(&self) -> &InboxDb {
        &self.inbox
    }

    /// Save a captured page.
    ///
    /// Steps, in strict order: local validation, duplicate-URL check against
    /// the inbox, token exchange, screenshot upload, schema discovery,
    /// record creation, best-effort inbox write. A duplicate URL
    /// short-circuits before any network call.
    pub async fn save(&self, capture: &PageCapture) -> Result<SaveOutcome, Error> {
        capture.validate(self.screenshot_min_bytes)?;

        // The inbox is convenience-only; a lookup failure must not block a
        // durable save, so it is treated like a miss.
        match self.inbox.find_by_url(&capture.url).await {
            Ok(Some(existing)) => {
                tracing::info!(url = %capture.url, "already saved recently, skipping remote write");
                return Ok(SaveOutcome::Duplicate(existing));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "inbox lookup failed, continuing with save"),
        }

        let token = self.client.access_token().await?;

        let shot = capture.screenshot(self.screenshot_min_bytes)?;
        let file_name = format!("screenshot_{}.jpg", chrono::Utc::now().timestamp_millis());
        let asset = self
            .client
            .upload_media(shot.bytes, &file_name, &shot.mime_type, "bitable", &self.base_id)
            .await?;

        let schema = self.client.resolve_schema(&token, &self.base_id).await?;

        let record = self
            .client
            .create_record(&token, &self.base_id, &schema.table_id, &schema.fields, capture, &asset)
            .await?;

        tracing::info!(record_id = %record.record_id, url = %capture.url, "page saved");

        let description = if capture.description.is_empty() { None } else { Some(capture.description.clone()) };
        let item = InboxItem::new(&capture.url, &capture.title, description, capture.favicon.clone())
            .with_record_id(record.record_id.clone());

        let inbox = match self.inbox.add(&item).await {
            Ok(()) => InboxSync::Synced(item),
            Err(e) => {
                tracing::warn!(error = %e, "inbox write failed after successful save");
                InboxSync::Failed(e.to_string())
            }
        };

        Ok(SaveOutcome::Saved { record, inbox })
    }
}
