//! Inbox item CRUD operations with bounded retention.
//!
//! Every write re-enforces the retention invariants: items older than the
//! configured age are dropped first, then the oldest items beyond the
//! configured count. Eviction always favors the newest items.

use super::connection::InboxDb;
use super::id::compute_item_id;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A locally cached record of a saved page.
///
/// The inbox holds only display metadata plus an optional reference to the
/// remote record; the remote store owns the record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon: Option<String>,
    /// RFC 3339 save time; also the eviction sort key.
    pub saved_at: String,
    /// Server-assigned record id, when the remote write succeeded.
    pub record_id: Option<String>,
}

impl InboxItem {
    /// Build an item stamped with the current time; the id is derived from
    /// the URL and the timestamp.
    pub fn new(url: &str, title: &str, description: Option<String>, favicon: Option<String>) -> Self {
        let saved_at = chrono::Utc::now().to_rfc3339();
        Self {
            id: compute_item_id(url, &saved_at),
            url: url.to_string(),
            title: title.to_string(),
            description,
            favicon,
            saved_at,
            record_id: None,
        }
    }

    /// Attach the server-assigned record id.
    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<InboxItem, rusqlite::Error> {
    Ok(InboxItem {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        favicon: row.get(4)?,
        saved_at: row.get(5)?,
        record_id: row.get(6)?,
    })
}

const ITEM_COLUMNS: &str = "id, url, title, description, favicon, saved_at, record_id";

impl InboxDb {
    /// Insert an item, then enforce the retention invariants.
    ///
    /// Eviction order: age first (anything older than the limit), then count
    /// (oldest beyond `max_items`). Runs in a single database call so a
    /// concurrent reader never observes an over-full inbox.
    pub async fn add(&self, item: &InboxItem) -> Result<(), Error> {
        let item = item.clone();
        let limits = self.limits;
        let cutoff = (chrono::Utc::now() - limits.max_age).to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO inbox_items (id, url, title, description, favicon, saved_at, record_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        url = excluded.url,
                        title = excluded.title,
                        description = excluded.description,
                        favicon = excluded.favicon,
                        saved_at = excluded.saved_at,
                        record_id = excluded.record_id",
                    params![
                        &item.id,
                        &item.url,
                        &item.title,
                        &item.description,
                        &item.favicon,
                        &item.saved_at,
                        &item.record_id,
                    ],
                )?;

                let aged = conn.execute("DELETE FROM inbox_items WHERE saved_at < ?1", params![cutoff])?;

                let count: i64 = conn.query_row("SELECT COUNT(*) FROM inbox_items", [], |row| row.get(0))?;
                let max = limits.max_items as i64;
                let mut trimmed = 0;
                if count > max {
                    trimmed = conn.execute(
                        "DELETE FROM inbox_items WHERE id IN (
                            SELECT id FROM inbox_items ORDER BY saved_at ASC LIMIT ?1
                        )",
                        params![count - max],
                    )?;
                }

                if aged > 0 || trimmed > 0 {
                    tracing::debug!(aged, trimmed, "evicted inbox items");
                }

                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an item by URL.
    ///
    /// Used to short-circuit duplicate saves. Returns the most recent match
    /// when several items share a URL.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<InboxItem>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<InboxItem>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM inbox_items WHERE url = ?1
                     ORDER BY saved_at DESC LIMIT 1"
                ))?;

                let result = stmt.query_row(params![url], row_to_item);

                match result {
                    Ok(item) => Ok(Some(item)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a single item by id.
    ///
    /// Returns true if an item was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM inbox_items WHERE id = ?1", params![id])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// List all items, newest first.
    pub async fn list(&self) -> Result<Vec<InboxItem>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<InboxItem>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM inbox_items ORDER BY saved_at DESC"
                ))?;
                let items = stmt
                    .query_map([], row_to_item)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether the inbox holds no items.
    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// Number of items currently retained.
    pub async fn len(&self) -> Result<usize, Error> {
        self.conn
            .call(|conn| -> Result<usize, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM inbox_items", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }
}
