//! SQLite-backed inbox of recently saved pages.
//!
//! The inbox is a bounded local mirror of recent saves, independent of the
//! remote store's availability. It supports:
//!
//! - Duplicate-URL lookup to short-circuit repeated saves
//! - Count-bounded and age-bounded eviction, enforced on every write
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod id;
pub mod items;
pub mod migrations;

pub use crate::Error;

pub use connection::{InboxDb, InboxLimits};
pub use id::compute_item_id;
pub use items::InboxItem;
