//! Destination schema discovery and fuzzy column matching.
//!
//! Bitable schemas are user-authored; column names are not guaranteed to
//! match the canonical English names. Each logical capture field is matched
//! case-insensitively against a small synonym set, and an unmatched field
//! keeps its default English column name. The map is rebuilt on every save
//! since the remote schema can change between saves.

use super::{ApiEnvelope, BitableClient};
use clipbase_core::Error;
use serde::{Deserialize, Serialize};

const URL_SYNONYMS: &[&str] = &["url", "link", "链接"];
const TITLE_SYNONYMS: &[&str] = &["title", "标题"];
const DESCRIPTION_SYNONYMS: &[&str] = &["description", "desc", "描述", "备注"];
const SCREENSHOT_SYNONYMS: &[&str] = &["screenshot", "截图", "image", "图片"];
const CONTENT_SYNONYMS: &[&str] = &["content", "正文", "text"];

/// Mapping from logical capture fields to actual column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMap {
    pub url: String,
    pub title: String,
    pub description: String,
    pub screenshot: String,
    pub content: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            url: "URL".to_string(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            screenshot: "Screenshot".to_string(),
            content: "Content".to_string(),
        }
    }
}

impl FieldMap {
    /// Resolve logical fields against the table's column names.
    ///
    /// Matching is case-insensitive and the first matching column wins.
    /// A field with no matching column keeps its default name; the record
    /// write will then fail if that column truly does not exist.
    pub fn resolve(columns: &[String]) -> Self {
        let mut url = None;
        let mut title = None;
        let mut description = None;
        let mut screenshot = None;
        let mut content = None;

        for column in columns {
            let lower = column.to_lowercase();
            if url.is_none() && URL_SYNONYMS.contains(&lower.as_str()) {
                url = Some(column.clone());
            } else if title.is_none() && TITLE_SYNONYMS.contains(&lower.as_str()) {
                title = Some(column.clone());
            } else if description.is_none() && DESCRIPTION_SYNONYMS.contains(&lower.as_str()) {
                description = Some(column.clone());
            } else if screenshot.is_none() && SCREENSHOT_SYNONYMS.contains(&lower.as_str()) {
                screenshot = Some(column.clone());
            } else if content.is_none() && CONTENT_SYNONYMS.contains(&lower.as_str()) {
                content = Some(column.clone());
            }
        }

        let defaults = Self::default();
        Self {
            url: url.unwrap_or(defaults.url),
            title: title.unwrap_or(defaults.title),
            description: description.unwrap_or(defaults.description),
            screenshot: screenshot.unwrap_or(defaults.screenshot),
            content: content.unwrap_or(defaults.content),
        }
    }
}

/// Result of schema discovery: the target table and its column mapping.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub table_id: String,
    pub fields: FieldMap,
}

#[derive(Debug, Deserialize)]
struct TableInfo {
    table_id: String,
}

#[derive(Debug, Deserialize)]
struct TableList {
    #[serde(default)]
    items: Vec<TableInfo>,
}

#[derive(Debug, Deserialize)]
struct FieldInfo {
    field_name: String,
}

#[derive(Debug, Deserialize)]
struct FieldList {
    #[serde(default)]
    items: Vec<FieldInfo>,
}

impl BitableClient {
    /// Discover the destination table and resolve the column mapping.
    ///
    /// Always targets the first table of the base; a base with no tables is
    /// a schema error. Multi-table bases are not supported.
    pub async fn resolve_schema(&self, token: &str, base_id: &str) -> Result<ResolvedSchema, Error> {
        let tables: TableList = self
            .get_schema_json(token, &format!("/bitable/v1/apps/{base_id}/tables"))
            .await?;

        let table_id = tables
            .items
            .into_iter()
            .next()
            .map(|t| t.table_id)
            .ok_or_else(|| Error::Schema { message: "base has no tables".to_string(), detail: None })?;

        let fields: FieldList = self
            .get_schema_json(token, &format!("/bitable/v1/apps/{base_id}/tables/{table_id}/fields"))
            .await?;

        let columns: Vec<String> = fields.items.into_iter().map(|f| f.field_name).collect();
        let fields = FieldMap::resolve(&columns);

        tracing::debug!(%table_id, ?fields, "resolved destination schema");

        Ok(ResolvedSchema { table_id, fields })
    }

    async fn get_schema_json<T: serde::de::DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path);
        let response = self.http.get(&url).bearer_auth(token).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("schema discovery timed out: {path}"))
            } else {
                Error::Schema { message: format!("network error: {e}"), detail: None }
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Schema { message: format!("failed to read response: {e}"), detail: None })?;

        if !status.is_success() {
            return Err(Error::Schema { message: format!("status {}", status.as_u16()), detail: Some(body) });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| Error::Schema {
            message: format!("invalid schema response: {e}"),
            detail: Some(body.clone()),
        })?;

        if envelope.code != 0 {
            return Err(Error::Schema {
                message: format!("schema discovery rejected: {} (code {})", envelope.msg, envelope.code),
                detail: Some(body),
            });
        }

        envelope
            .data
            .ok_or_else(|| Error::Schema { message: "schema response has no data".to_string(), detail: Some(body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitable::BitableConfig;
    use mockito::Server;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_exact_english_names() {
        let map = FieldMap::resolve(&columns(&["URL", "Title", "Description", "Screenshot", "Content"]));
        assert_eq!(map, FieldMap::default());
    }

    #[test]
    fn test_resolve_chinese_columns() {
        let map = FieldMap::resolve(&columns(&["链接", "标题", "备注", "图片", "正文"]));
        assert_eq!(map.url, "链接");
        assert_eq!(map.title, "标题");
        assert_eq!(map.description, "备注");
        assert_eq!(map.screenshot, "图片");
        assert_eq!(map.content, "正文");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let map = FieldMap::resolve(&columns(&["LINK", "TITLE", "desc", "IMAGE", "TEXT"]));
        assert_eq!(map.url, "LINK");
        assert_eq!(map.title, "TITLE");
        assert_eq!(map.description, "desc");
        assert_eq!(map.screenshot, "IMAGE");
        assert_eq!(map.content, "TEXT");
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let map = FieldMap::resolve(&columns(&["url", "link"]));
        assert_eq!(map.url, "url");
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let map = FieldMap::resolve(&columns(&["Notes", "Tags"]));
        assert_eq!(map, FieldMap::default());
    }

    #[test]
    fn test_resolve_empty_columns() {
        let map = FieldMap::resolve(&[]);
        assert_eq!(map, FieldMap::default());
    }

    #[tokio::test]
    async fn test_resolve_schema_no_tables() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/bitable/v1/apps/bascnTEST/tables")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"success","data":{"items":[]}}"#)
            .create_async()
            .await;

        let client = BitableClient::new(BitableConfig { base_url: server.url(), ..Default::default() }).unwrap();
        let result = client.resolve_schema("t-abc", "bascnTEST").await;

        assert!(matches!(result, Err(Error::Schema { message, .. }) if message.contains("no tables")));
    }

    #[tokio::test]
    async fn test_resolve_schema_happy_path() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/bitable/v1/apps/bascnTEST/tables")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"success","data":{"items":[{"table_id":"tblA","name":"clips"},{"table_id":"tblB","name":"other"}]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/bitable/v1/apps/bascnTEST/tables/tblA/fields")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":0,"msg":"success","data":{"items":[{"field_id":"f1","field_name":"链接","type":15},{"field_id":"f2","field_name":"标题","type":1}]}}"#,
            )
            .create_async()
            .await;

        let client = BitableClient::new(BitableConfig { base_url: server.url(), ..Default::default() }).unwrap();
        let schema = client.resolve_schema("t-abc", "bascnTEST").await.unwrap();

        // Only the first table is targeted.
        assert_eq!(schema.table_id, "tblA");
        assert_eq!(schema.fields.url, "链接");
        assert_eq!(schema.fields.title, "标题");
        assert_eq!(schema.fields.content, "Content");
    }

    #[tokio::test]
    async fn test_resolve_schema_remote_rejection() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/bitable/v1/apps/bascnTEST/tables")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":91402,"msg":"NOTEXIST"}"#)
            .create_async()
            .await;

        let client = BitableClient::new(BitableConfig { base_url: server.url(), ..Default::default() }).unwrap();
        let result = client.resolve_schema("t-abc", "bascnTEST").await;

        assert!(matches!(result, Err(Error::Schema { message, .. }) if message.contains("91402")));
    }
}
