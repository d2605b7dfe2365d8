//! Core types and shared functionality for clipbase.
//!
//! This crate provides:
//! - Inbox cache implementation with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod inbox;

pub use config::{AppConfig, ConfigError, Credentials};
pub use error::Error;
pub use inbox::{InboxDb, InboxItem, InboxLimits};
