//! # contract: collaborator interfaces for the publish pipeline
//!
//! The publisher never talks to a cloud SDK or the disk directly. It goes
//! through the three traits below, which are implemented by the production
//! clients in [`crate::aws`] and [`crate::fs`] and by `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - Each trait is annotated for `mockall`; the generated `Mock*` types are
//!   exported when the `test-export-mocks` feature is on (the default), so the
//!   integration tests under `tests/` can drive the publisher deterministically.
//!
//! ## Errors
//! - Backend failures are returned as [`BoxError`]. The publisher decides which
//!   of them are fatal (see [`crate::publish`]).

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::properties::ObjectProperties;

/// Boxed error returned by every collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single object upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    /// File contents, read from disk at upload time.
    pub body: Vec<u8>,
    /// Content type and any rule-supplied transport properties.
    pub properties: ObjectProperties,
}

/// One page of a prefix listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListObjectsRequest {
    pub bucket: String,
    pub prefix: String,
    /// `None` for the first page.
    pub continuation_token: Option<String>,
}

/// Keys returned by one listing call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Present when more pages remain.
    pub next_continuation_token: Option<String>,
}

/// Batch delete of the keys from a single listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteObjectsRequest {
    pub bucket: String,
    pub keys: Vec<String>,
}

/// Cache invalidation for a distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub paths: Vec<String>,
    /// Idempotency key; unique per invalidation call.
    pub caller_reference: String,
}

/// Object storage backend (S3 or compatible).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload one object.
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), BoxError>;

    /// List one page of keys under a prefix.
    async fn list_objects(&self, req: ListObjectsRequest) -> Result<ObjectPage, BoxError>;

    /// Delete a batch of keys.
    async fn delete_objects(&self, req: DeleteObjectsRequest) -> Result<(), BoxError>;
}

/// Content-distribution cache.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Create an invalidation, returning the backend's invalidation id.
    async fn create_invalidation(&self, req: InvalidationRequest) -> Result<String, BoxError>;
}

/// Local filesystem access used for registration and upload.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether `path` exists right now.
    async fn exists(&self, path: PathBuf) -> bool;

    async fn read_bytes(&self, path: PathBuf) -> std::io::Result<Vec<u8>>;

    /// Every non-directory entry below `root`, as paths relative to `root`.
    async fn list_files_recursive(&self, root: PathBuf) -> std::io::Result<Vec<PathBuf>>;
}
