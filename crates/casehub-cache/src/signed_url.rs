//! Signed-URL cache.
//!
//! Signing a download URL is a network round-trip on S3 and a hash on the
//! local provider; listings sign one icon per case on every request. This
//! cache keys by the stable object path, stores `(url, expiry)`, evicts
//! lazily on read, and is explicitly invalidated when the underlying
//! object is rewritten or deleted. Staleness within the TTL is cosmetic
//! (an old icon), never a correctness issue.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;

/// A cached signed URL with its expiry.
#[derive(Debug, Clone)]
struct Entry {
    url: String,
    expires_at: Instant,
}

/// Process-wide cache of minted signed URLs, keyed by object path.
#[derive(Debug)]
pub struct SignedUrlCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl SignedUrlCache {
    /// Create a cache whose entries live for `ttl`.
    ///
    /// The TTL should be comfortably shorter than the signed URLs' own
    /// lifetime so a cached URL is never handed out already expired.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up a still-valid URL for the object path, evicting it if expired.
    pub fn get(&self, path: &str) -> Option<String> {
        match self.entries.get(path) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.url.clone()),
            Some(_) => {
                drop(self.entries.remove(path));
                trace!(path, "Evicted expired signed URL");
                None
            }
            None => None,
        }
    }

    /// Store a freshly minted URL for the object path.
    pub fn insert(&self, path: &str, url: String) {
        self.entries.insert(
            path.to_string(),
            Entry {
                url,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop the cached URL for one object path (call on write/delete).
    pub fn invalidate(&self, path: &str) {
        self.entries.remove(path);
    }

    /// Drop every cached URL under a prefix (call on case deletion).
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Number of live entries (expired-but-unevicted included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
