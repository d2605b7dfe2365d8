//! Client code for clipbase.
//!
//! This crate provides the Feishu Bitable API client, the page capture
//! model, and the save pipeline that chains them together.

pub mod bitable;
pub mod capture;
pub mod pipeline;

pub use bitable::{BitableClient, BitableConfig, FieldMap, ResolvedSchema, SavedRecord, UploadedAsset};

pub use capture::{DataUri, PageCapture, Screenshot};

pub use pipeline::{InboxSync, Pipeline, SaveOutcome};
