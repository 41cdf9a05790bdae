//! Access to the CRM backend that owns the records.
//!
//! Handlers only see `RecordStore`; `BackendClient` is the HTTP
//! implementation. Failed calls are reported, never retried: a retry is
//! always an explicit user action.

pub mod client;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Record, RecordKind};
use crate::remarks::log::NewRemark;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self, kind: RecordKind) -> Result<Vec<Record>, BackendError>;

    /// Returns the whole updated parent; callers replace their copy with it.
    async fn append_remark(
        &self,
        kind: RecordKind,
        parent_id: &str,
        remark: &NewRemark,
    ) -> Result<Record, BackendError>;

    async fn deactivate_remark(
        &self,
        kind: RecordKind,
        parent_id: &str,
        sequence: u32,
    ) -> Result<Record, BackendError>;

    async fn delete_record(&self, kind: RecordKind, id: &str) -> Result<(), BackendError>;
}
