//! Object store client interface.
//!
//! The narrow contract this crate requires from the backing store: flat
//! string keys, prefix listing, and non-atomic single-key primitives. All
//! hierarchy semantics stay out of here and live in [`crate::paths`] and the
//! service layer.

use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncRead;

use crate::error::{DeleteFailure, StoreError};

pub mod driver;

/// Streamed object content. The caller owns the reader and must drop it on
/// every exit path to release the underlying connection.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Stat result for a single object.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Primitive operations against the backing object store.
///
/// Every method maps to one (or a small, fixed number of) store calls; none
/// are atomic across keys and none know about folders. Side effects are
/// confined entirely to the backing store; implementations hold no state the
/// engine depends on.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether `key` exists. A typed "not found" from the store maps to
    /// `false`; any other fault propagates.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    async fn stat(&self, key: &str) -> Result<ObjectInfo, StoreError>;

    /// All keys sharing `prefix`, the prefix key itself included when such
    /// an object exists. Non-recursive mode returns immediate children only,
    /// with nested subtrees collapsed to their folder-shaped prefix. The
    /// result is fully materialized; keys created concurrently during
    /// pagination may or may not appear.
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<String>, StoreError>;

    /// Creates or overwrites `key`. An empty `content` with a
    /// delimiter-terminated key is how folder markers come to exist.
    async fn put(&self, key: &str, content: Bytes) -> Result<(), StoreError>;

    async fn copy(&self, src: &str, dst: &str) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Best-effort bulk delete. Per-key failures come back in the `Ok`
    /// value; the caller decides whether partial failure is fatal.
    async fn batch_delete(&self, keys: &[String]) -> Result<Vec<DeleteFailure>, StoreError>;

    async fn get_stream(&self, key: &str) -> Result<ObjectReader, StoreError>;
}
