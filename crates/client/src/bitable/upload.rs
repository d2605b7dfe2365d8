//! Drive media upload.
//!
//! Uploads the screenshot bytes as a drive asset attached to the target
//! base. Repeated calls create distinct remote assets; there is no
//! idempotency and no cleanup of assets that end up unused.

use super::{ApiEnvelope, BitableClient};
use clipbase_core::Error;
use reqwest::multipart;
use serde::Deserialize;

/// Reference to an uploaded drive asset, used to attach it to a record.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    /// Opaque token identifying the asset.
    pub file_token: String,
    /// File name the drive stored the asset under.
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    file_token: Option<String>,
    file_name: Option<String>,
}

impl BitableClient {
    /// Upload a binary asset to the drive, parented to `parent_node`.
    ///
    /// `parent_type` is the container kind, `"bitable"` for attachments that
    /// will be referenced from a base.
    pub async fn upload_media(
        &self, bytes: Vec<u8>, file_name: &str, mime_type: &str, parent_type: &str, parent_node: &str,
    ) -> Result<UploadedAsset, Error> {
        if bytes.is_empty() {
            return Err(Error::Upload { message: "asset is empty".to_string(), detail: None });
        }

        let token = self.access_token().await?;
        let size = bytes.len();

        tracing::debug!(file_name, size, mime_type, "uploading media");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| Error::Upload { message: format!("invalid mime type {mime_type}: {e}"), detail: None })?;

        let form = multipart::Form::new()
            .text("file_name", file_name.to_string())
            .text("parent_type", parent_type.to_string())
            .text("parent_node", parent_node.to_string())
            .text("size", size.to_string())
            .part("file", part);

        let url = self.endpoint("/drive/v1/medias/upload_all");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("media upload timed out".to_string())
                } else {
                    Error::Upload { message: format!("network error: {e}"), detail: None }
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upload { message: format!("failed to read response: {e}"), detail: None })?;

        if !status.is_success() {
            return Err(Error::Upload { message: format!("status {}", status.as_u16()), detail: Some(body) });
        }

        let envelope: ApiEnvelope<UploadData> = serde_json::from_str(&body).map_err(|e| Error::Upload {
            message: format!("invalid upload response: {e}"),
            detail: Some(body.clone()),
        })?;

        if envelope.code != 0 {
            return Err(Error::Upload {
                message: format!("upload rejected: {} (code {})", envelope.msg, envelope.code),
                detail: Some(body),
            });
        }

        let data = envelope.data.unwrap_or(UploadData { file_token: None, file_name: None });
        let file_token = data.file_token.ok_or_else(|| Error::Upload {
            message: "upload succeeded but response lacks file_token".to_string(),
            detail: Some(body),
        })?;

        tracing::debug!(%file_token, "media uploaded");

        Ok(UploadedAsset { file_token, file_name: data.file_name.unwrap_or_else(|| file_name.to_string()) })
    }
}
