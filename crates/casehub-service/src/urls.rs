//! Tolerant signed-URL minting through the process-wide cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use casehub_cache::SignedUrlCache;
use casehub_core::traits::storage::ObjectStore;

/// Mint (or fetch from cache) a signed URL for an object path.
///
/// Signing failures are tolerated: the caller gets `None` and the response
/// simply carries no URL for that asset. A missing icon must never fail a
/// listing.
pub async fn signed_or_none(
    objects: &Arc<dyn ObjectStore>,
    cache: &SignedUrlCache,
    path: &str,
    ttl: Duration,
) -> Option<String> {
    if let Some(url) = cache.get(path) {
        return Some(url);
    }

    match objects.sign_url(path, ttl).await {
        Ok(url) => {
            cache.insert(path, url.clone());
            Some(url)
        }
        Err(e) => {
            warn!(path, error = %e, "Failed to sign object URL, omitting");
            None
        }
    }
}
