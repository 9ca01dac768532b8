//! Object store construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use casehub_core::config::storage::StorageConfig;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::traits::storage::ObjectStore;

use crate::providers::LocalObjectStore;
use crate::sign::UrlSigner;

/// Owns the configured [`ObjectStore`] and, for the local provider, the
/// [`UrlSigner`] the API uses to redeem signed download URLs.
#[derive(Debug, Clone)]
pub struct StorageManager {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<UrlSigner>>,
    signed_url_ttl: Duration,
}

impl StorageManager {
    /// Build the provider named by `storage.provider`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let signed_url_ttl = Duration::from_secs(config.signed_url_ttl_seconds);

        match config.provider.as_str() {
            "local" => {
                let signer = Arc::new(UrlSigner::new(&config.local.url_signing_secret));
                let store = LocalObjectStore::new(
                    &config.local.root,
                    &config.local.public_base_url,
                    Arc::clone(&signer),
                )
                .await?;
                Ok(Self {
                    store: Arc::new(store),
                    signer: Some(signer),
                    signed_url_ttl,
                })
            }
            "s3" => {
                #[cfg(feature = "s3")]
                {
                    let store = crate::providers::s3::S3ObjectStore::new(&config.s3).await?;
                    Ok(Self {
                        store: Arc::new(store),
                        signer: None,
                        signed_url_ttl,
                    })
                }
                #[cfg(not(feature = "s3"))]
                {
                    Err(AppError::configuration(
                        "storage.provider = \"s3\" requires building with the `s3` feature",
                    ))
                }
            }
            other => Err(AppError::configuration(format!(
                "Unknown storage provider: {other}"
            ))),
        }
    }

    /// The configured object store.
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// The local-provider URL signer, if the local provider is active.
    pub fn signer(&self) -> Option<Arc<UrlSigner>> {
        self.signer.clone()
    }

    /// Lifetime minted signed URLs are valid for.
    pub fn signed_url_ttl(&self) -> Duration {
        self.signed_url_ttl
    }
}
