//! Record construction and submission.
//!
//! Builds the remote row from the capture and the resolved column names.
//! A write failure carries a diagnostic payload echoing the failed request
//! context (table id, field map, truncated content preview) so a column
//! mismatch is visible without re-running the save.

use super::schema::FieldMap;
use super::upload::UploadedAsset;
use super::{ApiEnvelope, BitableClient};
use crate::capture::PageCapture;
use clipbase_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Characters of content echoed into a write-failure diagnostic.
const CONTENT_PREVIEW_CHARS: usize = 100;

/// A row created in the destination table, as reported by the remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecord {
    /// Server-assigned record id.
    pub record_id: String,
    /// The fields as the remote stored them.
    #[serde(default)]
    pub fields: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    record: Option<RecordBody>,
}

#[derive(Debug, Deserialize)]
struct RecordBody {
    record_id: Option<String>,
    #[serde(default)]
    fields: serde_json::Value,
}

fn build_fields(field_map: &FieldMap, capture: &PageCapture, asset: &UploadedAsset) -> serde_json::Value {
    let mut fields = serde_json::Map::new();

    if !capture.url.is_empty() {
        fields.insert(field_map.url.clone(), json!(capture.url));
    }
    if !capture.title.is_empty() {
        fields.insert(field_map.title.clone(), json!(capture.title));
    }
    if !capture.description.is_empty() {
        fields.insert(field_map.description.clone(), json!(capture.description));
    }
    if !capture.content.is_empty() {
        fields.insert(field_map.content.clone(), json!(capture.content));
    }

    // The screenshot is always written, as a one-element attachment list.
    fields.insert(
        field_map.screenshot.clone(),
        json!([{ "file_token": asset.file_token, "name": asset.file_name }]),
    );

    serde_json::Value::Object(fields)
}

impl BitableClient {
    /// Create one row in the destination table.
    ///
    /// Not idempotent; every call creates a new record.
    pub async fn create_record(
        &self, token: &str, base_id: &str, table_id: &str, field_map: &FieldMap, capture: &PageCapture,
        asset: &UploadedAsset,
    ) -> Result<SavedRecord, Error> {
        let fields = build_fields(field_map, capture, asset);

        tracing::debug!(%table_id, "creating record");

        let url = self.endpoint(&format!("/bitable/v1/apps/{base_id}/tables/{table_id}/records"));
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("record creation timed out".to_string())
                } else {
                    Error::Write { message: format!("network error: {e}"), detail: None }
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Write { message: format!("failed to read response: {e}"), detail: None })?;

        let diagnostic = |code: i64, msg: &str, body: &str| {
            json!({
                "code": code,
                "msg": msg,
                "table_id": table_id,
                "field_map": field_map,
                "content_preview": capture.content.chars().take(CONTENT_PREVIEW_CHARS).collect::<String>(),
                "response": body,
            })
            .to_string()
        };

        if !status.is_success() {
            return Err(Error::Write {
                message: format!("status {}", status.as_u16()),
                detail: Some(diagnostic(status.as_u16() as i64, "", &body)),
            });
        }

        let envelope: ApiEnvelope<RecordData> = serde_json::from_str(&body).map_err(|e| Error::Write {
            message: format!("invalid record response: {e}"),
            detail: Some(body.clone()),
        })?;

        if envelope.code != 0 {
            return Err(Error::Write {
                message: format!("record creation rejected: {} (code {})", envelope.msg, envelope.code),
                detail: Some(diagnostic(envelope.code, &envelope.msg, &body)),
            });
        }

        let record = envelope.data.and_then(|d| d.record).ok_or_else(|| Error::Write {
            message: "record response has no record".to_string(),
            detail: Some(body.clone()),
        })?;

        let record_id = record.record_id.ok_or_else(|| Error::Write {
            message: "record response lacks record_id".to_string(),
            detail: Some(body),
        })?;

        tracing::debug!(%record_id, "record created");

        Ok(SavedRecord { record_id, fields: record.fields })
    }
}
