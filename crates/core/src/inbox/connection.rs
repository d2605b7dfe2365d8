//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

/// Retention bounds enforced on every inbox write.
#[derive(Debug, Clone, Copy)]
pub struct InboxLimits {
    /// Maximum number of retained items; oldest are dropped beyond this.
    pub max_items: usize,
    /// Maximum item age; anything older is dropped.
    pub max_age: chrono::Duration,
}

impl Default for InboxLimits {
    fn default() -> Self {
        Self { max_items: 500, max_age: chrono::Duration::hours(24) }
    }
}

/// Inbox database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct InboxDb {
    pub(crate) conn: Connection,
    pub(crate) limits: InboxLimits,
}

impl InboxDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>, limits: InboxLimits) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, limits).await
    }

    /// Open an in-memory database for testing.
    ///
    /// Creates a temporary in-memory SQLite database with the same
    /// pragma configuration as file-based databases.
    pub async fn open_in_memory(limits: InboxLimits) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, limits).await
    }

    async fn init(conn: Connection, limits: InboxLimits) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn, limits })
    }

    /// Retention bounds this handle enforces.
    pub fn limits(&self) -> InboxLimits {
        self.limits
    }
}
