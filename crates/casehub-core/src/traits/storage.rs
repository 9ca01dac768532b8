//! Object store trait for pluggable blob storage backends.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for bucket-style object storage backends.
///
/// Keys are UTF-8 path-like strings (`demos/{caseId}/config.json`). The
/// [`ObjectStore`] trait is defined here in `casehub-core` and implemented
/// in `casehub-storage` for the local filesystem and S3.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object into memory as a complete byte vector.
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Write an object at the given key, replacing any existing content.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Delete the object at the given key.
    ///
    /// Deleting a missing key is a [`NotFound`](crate::error::ErrorKind::NotFound)
    /// error so that callers can distinguish "gone" from "never existed".
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether an object exists at the given key.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// List all object keys under a prefix (recursive).
    async fn list(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// List the immediate child "folder" names under a prefix
    /// (delimiter-style listing, one path segment deep).
    async fn list_prefixes(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// Mint a time-limited signed download URL for the object.
    async fn sign_url(&self, key: &str, expires_in: Duration) -> AppResult<String>;
}
