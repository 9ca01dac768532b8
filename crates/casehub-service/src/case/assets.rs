//! Object-store asset fan-out for case lifecycle events.
//!
//! Every asset lives at a deterministic path under `demos/{case_id}/`, so
//! deletion can be driven by convention rather than by a manifest. Reads
//! that feed cleanup are tolerant: a missing icon must never block removing
//! the assistant that referenced it.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use casehub_cache::MemoryCacheProvider;
use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_core::traits::cache::CacheProvider;
use casehub_core::traits::storage::ObjectStore;
use casehub_entity::config_doc::{Assistant, CaseConfig, DocumentRef};
use casehub_storage::paths;

use super::UploadedFile;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Writes and removes the object-store assets a case configuration refers to.
///
/// Markdown reads are served through a TTL cache; every write path owned by
/// this manager invalidates the corresponding entry, so cached content can
/// only go stale if the object store is mutated out of band.
#[derive(Debug, Clone)]
pub struct AssetLifecycle {
    objects: Arc<dyn ObjectStore>,
    markdown_cache: Arc<MemoryCacheProvider>,
}

impl AssetLifecycle {
    /// Creates a lifecycle manager over the given object store.
    pub fn new(objects: Arc<dyn ObjectStore>, markdown_cache: Arc<MemoryCacheProvider>) -> Self {
        Self {
            objects,
            markdown_cache,
        }
    }

    /// Writes the case icon, returning the object path it was stored at.
    ///
    /// Falls back to a synthesized single-letter SVG avatar when no file
    /// was uploaded.
    pub async fn write_case_icon(
        &self,
        case_id: &str,
        icon: Option<&UploadedFile>,
        title: &str,
    ) -> AppResult<String> {
        match icon {
            Some(file) => {
                let ext = icon_extension_of(&file.filename)?;
                let path = paths::case_icon_path(case_id, &ext);
                self.objects
                    .put(&path, file.data.clone(), &file.content_type)
                    .await?;
                Ok(path)
            }
            None => {
                let path = paths::case_icon_path(case_id, "svg");
                let svg = default_avatar_svg(title);
                self.objects
                    .put(&path, Bytes::from(svg), SVG_CONTENT_TYPE)
                    .await?;
                Ok(path)
            }
        }
    }

    /// Writes an assistant icon, returning the object path it was stored at.
    pub async fn write_assistant_icon(
        &self,
        case_id: &str,
        assistant_id: &str,
        icon: Option<&UploadedFile>,
        name: &str,
    ) -> AppResult<String> {
        match icon {
            Some(file) => {
                let ext = icon_extension_of(&file.filename)?;
                let path = paths::assistant_icon_path(case_id, assistant_id, &ext);
                self.objects
                    .put(&path, file.data.clone(), &file.content_type)
                    .await?;
                Ok(path)
            }
            None => {
                let path = paths::assistant_icon_path(case_id, assistant_id, "svg");
                let svg = default_avatar_svg(name);
                self.objects
                    .put(&path, Bytes::from(svg), SVG_CONTENT_TYPE)
                    .await?;
                Ok(path)
            }
        }
    }

    /// Writes an assistant's prompt markdown, returning its object path.
    pub async fn write_assistant_markdown(
        &self,
        case_id: &str,
        assistant_id: &str,
        markdown: &str,
    ) -> AppResult<String> {
        let path = paths::assistant_markdown_path(case_id, assistant_id);
        self.objects
            .put(
                &path,
                Bytes::from(markdown.to_owned()),
                MARKDOWN_CONTENT_TYPE,
            )
            .await?;
        self.markdown_cache.delete(&path).await?;
        Ok(path)
    }

    /// Writes the case explanation markdown, returning its object path.
    pub async fn write_explanation(&self, case_id: &str, markdown: &str) -> AppResult<String> {
        let path = paths::explanation_path(case_id);
        self.objects
            .put(
                &path,
                Bytes::from(markdown.to_owned()),
                MARKDOWN_CONTENT_TYPE,
            )
            .await?;
        self.markdown_cache.delete(&path).await?;
        Ok(path)
    }

    /// Fetches markdown stored at `path`, read-through cached.
    pub async fn read_markdown(&self, path: &str) -> AppResult<String> {
        if let Some(cached) = self.markdown_cache.get(path).await? {
            return Ok(cached);
        }
        let raw = self.objects.get(path).await?;
        let markdown = String::from_utf8(raw.to_vec()).map_err(|e| {
            AppError::new(
                ErrorKind::Serialization,
                format!("Markdown is not valid UTF-8: {e}"),
            )
        })?;
        self.markdown_cache.set_default(path, &markdown).await?;
        Ok(markdown)
    }

    /// Stores one supporting document under the case's `documents/` folder,
    /// keyed by its original filename.
    pub async fn write_document(
        &self,
        case_id: &str,
        file: &UploadedFile,
    ) -> AppResult<DocumentRef> {
        let filename = sanitize_filename(&file.filename)?;
        let path = paths::document_path(case_id, &filename);
        self.objects
            .put(&path, file.data.clone(), &file.content_type)
            .await?;
        Ok(DocumentRef {
            id: Uuid::new_v4().to_string(),
            name: filename,
            path,
        })
    }

    /// Serializes and writes the config document. Written last during
    /// creation so a reader who fetches the config finds every referenced
    /// asset already present.
    pub async fn write_config(&self, config: &CaseConfig) -> AppResult<()> {
        let path = paths::config_path(&config.id);
        let json = serde_json::to_vec_pretty(config)?;
        self.objects
            .put(&path, Bytes::from(json), JSON_CONTENT_TYPE)
            .await
    }

    /// Fetches and parses a case's config document.
    pub async fn read_config(&self, case_id: &str) -> AppResult<CaseConfig> {
        let raw = self.objects.get(&paths::config_path(case_id)).await?;
        let config: CaseConfig = serde_json::from_slice(&raw)?;
        Ok(config)
    }

    /// Fetches an assistant's prompt markdown, read-through cached.
    pub async fn read_assistant_markdown(
        &self,
        case_id: &str,
        assistant_id: &str,
    ) -> AppResult<String> {
        self.read_markdown(&paths::assistant_markdown_path(case_id, assistant_id))
            .await
    }

    /// Best-effort removal of one assistant's icon and markdown. Each
    /// failure is logged and tolerated independently.
    pub async fn delete_assistant_assets(&self, assistant: &Assistant) {
        if let Some(icon) = &assistant.icon_path {
            self.delete_tolerant(icon).await;
        }
        self.delete_tolerant(&assistant.markdown_path).await;
    }

    /// Tears down every object belonging to a case: the config, the icon,
    /// per-assistant assets, documents, then a sweep of anything left
    /// under the case's prefix. Partial failure is accepted; every skip is
    /// logged.
    pub async fn delete_case_assets(&self, config: &CaseConfig) {
        self.delete_tolerant(&paths::config_path(&config.id)).await;
        if let Some(icon) = &config.icon_path {
            self.delete_tolerant(icon).await;
        }
        for assistant in &config.assistants {
            self.delete_assistant_assets(assistant).await;
        }
        for document in &config.documents {
            self.delete_tolerant(&document.path).await;
        }
        self.sweep_prefix(&paths::case_prefix(&config.id)).await;
    }

    /// Removes any straggler objects under a prefix. Catches drift between
    /// the config's asset list and what is actually stored.
    pub async fn sweep_prefix(&self, prefix: &str) {
        let keys = match self.objects.list(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix, error = %e, "Sweep listing failed, leaving stragglers");
                return;
            }
        };
        for key in keys {
            self.delete_tolerant(&key).await;
        }
    }

    /// Signed-URL passthrough for callers that already hold the lifecycle.
    pub async fn sign_url(&self, path: &str, ttl: Duration) -> AppResult<String> {
        self.objects.sign_url(path, ttl).await
    }

    /// Underlying object store handle.
    pub fn objects(&self) -> &Arc<dyn ObjectStore> {
        &self.objects
    }

    /// Deletes one object, tolerating absence and logging any failure.
    pub async fn delete_tolerant(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        let _ = self.markdown_cache.delete(path).await;
        match self.objects.delete(path).await {
            Ok(()) => debug!(path, "Deleted object"),
            Err(e) if e.is_not_found() => debug!(path, "Object already gone"),
            Err(e) => warn!(path, error = %e, "Delete failed, skipping"),
        }
    }
}

/// Validates an uploaded icon's extension against the allowed set.
fn icon_extension_of(filename: &str) -> AppResult<String> {
    paths::icon_extension(filename).ok_or_else(|| {
        AppError::validation(format!(
            "Unsupported icon type for '{}': expected one of {}",
            filename,
            paths::ICON_EXTENSIONS.join(", ")
        ))
    })
}

/// Rejects filenames that would escape the case's document folder.
fn sanitize_filename(filename: &str) -> AppResult<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Document filename must not be empty"));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed.contains("..") {
        return Err(AppError::validation(format!(
            "Invalid document filename '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

/// Synthesizes a single-letter SVG avatar from a display name's initial.
/// Only alphanumeric initials reach the markup; anything that would need
/// XML escaping renders as the placeholder instead.
pub fn default_avatar_svg(name: &str) -> String {
    let initial = name
        .trim()
        .chars()
        .next()
        .filter(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string());
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="128" height="128" viewBox="0 0 128 128"><rect width="128" height="128" rx="24" fill="#4f6d7a"/><text x="64" y="82" font-family="sans-serif" font-size="56" fill="#ffffff" text-anchor="middle">{initial}</text></svg>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_avatar_uses_uppercased_initial() {
        let svg = default_avatar_svg("econ 101");
        assert!(svg.contains(">E</text>"));
    }

    #[test]
    fn default_avatar_handles_empty_names() {
        let svg = default_avatar_svg("   ");
        assert!(svg.contains(">?</text>"));
    }

    #[test]
    fn default_avatar_never_embeds_markup() {
        for name in ["<script>alert(1)</script>", "&entity", "\"quoted\""] {
            let svg = default_avatar_svg(name);
            assert!(svg.contains(">?</text>"), "leaked initial from {name:?}");
            assert!(!svg.contains("script"));
        }
    }

    #[test]
    fn sanitize_rejects_path_traversal() {
        assert!(sanitize_filename("../../etc/passwd").is_err());
        assert!(sanitize_filename("notes/chapter1.pdf").is_err());
        assert!(sanitize_filename("  ").is_err());
        assert_eq!(sanitize_filename(" syllabus.pdf ").unwrap(), "syllabus.pdf");
    }

    #[test]
    fn icon_extension_rejects_unknown_types() {
        assert!(icon_extension_of("icon.gif").is_err());
        assert_eq!(icon_extension_of("icon.PNG").unwrap(), "png");
    }
}
