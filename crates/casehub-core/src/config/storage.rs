//! Object store configuration.

use serde::{Deserialize, Serialize};

/// Object store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider type: `"local"` or `"s3"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Lifetime of minted signed URLs in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// Local filesystem provider settings.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3 provider settings.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

/// Local filesystem provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory for all stored objects.
    #[serde(default = "default_root")]
    pub root: String,
    /// Public base URL under which signed object URLs are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Secret used to sign local download URLs. A random per-process
    /// secret is generated when empty (signed URLs then die with the
    /// process, which is fine for development).
    #[serde(default)]
    pub url_signing_secret: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_base_url: default_public_base_url(),
            url_signing_secret: String::new(),
        }
    }
}

/// S3 provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3StorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// AWS region.
    #[serde(default)]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (empty = AWS).
    #[serde(default)]
    pub endpoint: String,
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_max_upload() -> u64 {
    50 * 1024 * 1024
}

fn default_signed_url_ttl() -> u64 {
    600
}

fn default_root() -> String {
    "data/objects".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
