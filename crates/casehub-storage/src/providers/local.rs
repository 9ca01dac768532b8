//! Local filesystem object store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_core::traits::storage::ObjectStore;

use crate::sign::UrlSigner;

/// Local filesystem object store.
///
/// Object keys map directly onto paths under the root directory. Signed
/// URLs point at the API's `/objects/{key}` route with a token minted by
/// the shared [`UrlSigner`].
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory for all stored objects.
    root: PathBuf,
    /// Public base URL signed object URLs are rooted at.
    public_base_url: String,
    /// Shared signer (the API route verifies with the same instance).
    signer: Arc<UrlSigner>,
}

impl LocalObjectStore {
    /// Create a new local object store rooted at the given path.
    pub async fn new(
        root_path: &str,
        public_base_url: &str,
        signer: Arc<UrlSigner>,
    ) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            signer,
        })
    }

    /// Resolve an object key to an absolute path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        let clean = key.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Turn an absolute path back into an object key.
    fn key_of(&self, path: &Path) -> AppResult<String> {
        let rel = path.strip_prefix(&self.root).map_err(|_| {
            AppError::storage(format!("Path escapes storage root: {}", path.display()))
        })?;
        Ok(rel.to_string_lossy().replace('\\', "/"))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(key);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read object: {key}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<()> {
        let full_path = self.resolve(key);
        self.ensure_parent(&full_path).await?;
        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {key}"),
                e,
            )
        })?;
        debug!(key, bytes = data.len(), "Wrote object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key);
        fs::remove_file(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete object: {key}"),
                    e,
                )
            }
        })?;
        debug!(key, "Deleted object");
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(fs::try_exists(self.resolve(key)).await.unwrap_or(false))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<String>> {
        let base = self.resolve(prefix);
        let mut keys = Vec::new();
        let mut stack = vec![base];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to list directory: {}", dir.display()),
                        e,
                    ));
                }
            };

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
            })? {
                let file_type = entry.file_type().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to stat directory entry", e)
                })?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else {
                    keys.push(self.key_of(&entry.path())?);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn list_prefixes(&self, prefix: &str) -> AppResult<Vec<String>> {
        let base = self.resolve(prefix);
        let mut entries = match fs::read_dir(&base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list prefix: {prefix}"),
                    e,
                ));
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let file_type = entry.file_type().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to stat directory entry", e)
            })?;
            if file_type.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn sign_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        if !self.exists(key).await? {
            return Err(AppError::not_found(format!("Object not found: {key}")));
        }
        let expires = chrono::Utc::now().timestamp() as u64 + expires_in.as_secs();
        let signature = self.signer.sign(key, expires);
        Ok(format!(
            "{}/objects/{key}?expires={expires}&sig={signature}",
            self.public_base_url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn make_store(dir: &tempfile::TempDir) -> LocalObjectStore {
        LocalObjectStore::new(
            dir.path().to_str().unwrap(),
            "http://localhost:8080",
            Arc::new(UrlSigner::new("test-secret")),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;

        store
            .put(
                "demos/cs101/config.json",
                Bytes::from_static(b"{}"),
                "application/json",
            )
            .await
            .unwrap();
        let data = store.get("demos/cs101/config.json").await.unwrap();
        assert_eq!(&data[..], b"{}");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let err = store.get("demos/none/config.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let err = store.delete("demos/none/icon.svg").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_is_recursive_and_prefix_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;

        for key in [
            "demos/cs101/config.json",
            "demos/cs101/markdown/tutor.md",
            "demos/cs202/config.json",
        ] {
            store
                .put(key, Bytes::from_static(b"x"), "text/plain")
                .await
                .unwrap();
        }

        let keys = store.list("demos/cs101/").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "demos/cs101/config.json".to_string(),
                "demos/cs101/markdown/tutor.md".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn list_prefixes_returns_case_folders() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;

        store
            .put("demos/cs101/config.json", Bytes::from_static(b"x"), "")
            .await
            .unwrap();
        store
            .put("demos/cs202/config.json", Bytes::from_static(b"x"), "")
            .await
            .unwrap();

        let prefixes = store.list_prefixes("demos/").await.unwrap();
        assert_eq!(prefixes, vec!["cs101".to_string(), "cs202".to_string()]);
    }

    #[tokio::test]
    async fn signed_url_carries_valid_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        store
            .put("demos/cs101/icon.svg", Bytes::from_static(b"<svg/>"), "")
            .await
            .unwrap();

        let url = store
            .sign_url("demos/cs101/icon.svg", Duration::from_secs(600))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/objects/demos/cs101/icon.svg?"));
        assert!(url.contains("expires="));
        assert!(url.contains("sig="));
    }

    #[tokio::test]
    async fn signing_a_missing_object_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let err = store
            .sign_url("demos/none/icon.svg", Duration::from_secs(600))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
