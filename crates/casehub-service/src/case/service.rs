//! Case CRUD on top of the reconciler and asset lifecycle.
//!
//! Validation runs before any write so a rejected request leaves both
//! stores untouched. Creation writes the config document last; deletion
//! removes the relational row first and then fans out over the objects.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use casehub_auth::{CasePermissions, PasswordHasher};
use casehub_cache::SignedUrlCache;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_core::types::is_static_case_id;
use casehub_database::AccessStore;
use casehub_entity::case::Case;
use casehub_entity::config_doc::{Assistant, CaseConfig};
use casehub_entity::grant::GrantRole;
use casehub_storage::paths;

use super::assets::AssetLifecycle;
use super::reconcile::Reconciler;
use super::{AssistantView, CaseDetail, DocumentView, NewCase, UpdateCase, UploadedFile};
use crate::access::permissions_for;
use crate::context::RequestContext;
use crate::urls::signed_or_none;

const DEFAULT_EXPLANATION: &str = "# About this case\n\nNo explanation has been written yet.\n";

/// Case lifecycle operations.
#[derive(Debug, Clone)]
pub struct CaseService {
    store: Arc<dyn AccessStore>,
    assets: AssetLifecycle,
    reconciler: Reconciler,
    hasher: PasswordHasher,
    url_cache: Arc<SignedUrlCache>,
    signed_url_ttl: Duration,
}

impl CaseService {
    /// Creates the service over shared stores.
    pub fn new(
        store: Arc<dyn AccessStore>,
        assets: AssetLifecycle,
        reconciler: Reconciler,
        url_cache: Arc<SignedUrlCache>,
        signed_url_ttl: Duration,
    ) -> Self {
        Self {
            store,
            assets,
            reconciler,
            hasher: PasswordHasher::new(),
            url_cache,
            signed_url_ttl,
        }
    }

    /// Creates a case: validates everything up front, fans out the asset
    /// writes, writes the config last, then projects the relational row.
    pub async fn create(&self, ctx: &RequestContext, input: NewCase) -> AppResult<CaseDetail> {
        if !ctx.user.may_create_cases() {
            return Err(AppError::forbidden("You may not create cases"));
        }
        reject_static(&input.id)?;
        validate_case_id(&input.id)?;
        if input.title.trim().is_empty() {
            return Err(AppError::validation("Case title must not be empty"));
        }
        if self.store.find_case(&input.id).await?.is_some()
            || self
                .assets
                .objects()
                .exists(&paths::config_path(&input.id))
                .await?
        {
            return Err(AppError::conflict(format!(
                "Case '{}' already exists",
                input.id
            )));
        }
        let mut assistant_ids = std::collections::HashSet::new();
        for assistant in &input.assistants {
            validate_assistant_id(&assistant.id)?;
            if !assistant_ids.insert(assistant.id.clone()) {
                return Err(AppError::validation(format!(
                    "Duplicate assistant id '{}'",
                    assistant.id
                )));
            }
            if assistant
                .prompt_markdown
                .as_deref()
                .is_none_or(|m| m.trim().is_empty())
            {
                return Err(AppError::validation(format!(
                    "Assistant '{}' is missing its prompt content",
                    assistant.name
                )));
            }
        }

        // Nothing has been written yet; from here on, failures are fatal
        // for the request and may leave partial objects behind.
        let now = chrono::Utc::now();
        let icon_path = self
            .assets
            .write_case_icon(&input.id, input.icon.as_ref(), &input.title)
            .await?;

        let mut assistants = Vec::with_capacity(input.assistants.len());
        for new_assistant in &input.assistants {
            let markdown = new_assistant
                .prompt_markdown
                .as_deref()
                .unwrap_or_default();
            let markdown_path = self
                .assets
                .write_assistant_markdown(&input.id, &new_assistant.id, markdown)
                .await?;
            let assistant_icon = self
                .assets
                .write_assistant_icon(
                    &input.id,
                    &new_assistant.id,
                    new_assistant.icon.as_ref(),
                    &new_assistant.name,
                )
                .await?;
            let password = self.hash_optional(new_assistant.password.as_deref())?;
            assistants.push(Assistant {
                id: new_assistant.id.clone(),
                case_id: input.id.clone(),
                name: new_assistant.name.clone(),
                description: new_assistant.description.clone(),
                icon_path: Some(assistant_icon),
                has_password: password.is_some(),
                password,
                is_available_at_start: new_assistant.is_available_at_start,
                order_index: new_assistant.order_index,
                markdown_path,
                locked_label: new_assistant.locked_label.clone(),
            });
        }
        assistants.sort_by_key(|a| a.order_index);

        let mut documents = Vec::with_capacity(input.documents.len());
        for file in &input.documents {
            documents.push(self.assets.write_document(&input.id, file).await?);
        }

        let explanation = input
            .explanation_markdown
            .as_deref()
            .unwrap_or(DEFAULT_EXPLANATION);
        let explanation_path = self.assets.write_explanation(&input.id, explanation).await?;

        let password = self.hash_optional(input.password.as_deref())?;
        let config = CaseConfig {
            id: input.id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            author: ctx.user.email.clone(),
            icon_path: Some(icon_path),
            has_password: password.is_some(),
            password,
            explanation_markdown_path: Some(explanation_path),
            assistants,
            documents,
            created_at: now,
            updated_at: now,
            revision: 1,
        };
        self.assets.write_config(&config).await?;

        let (case, _) = self
            .store
            .upsert_case(
                &config.id,
                &config.title,
                config.description.as_deref(),
                ctx.user_id(),
            )
            .await?;
        self.store
            .upsert_access_grant(ctx.user_id(), &case.id, GrantRole::Professor, ctx.user_id())
            .await?;

        info!(case_id = %case.id, creator = %ctx.user.email, "Created case");
        self.detail(&case, &config, CasePermissions::ALL).await
    }

    /// Fetches a case's full detail after the access check and, for
    /// viewers without edit rights, the case-lock password check.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        password: Option<&str>,
    ) -> AppResult<CaseDetail> {
        let (case, config) = self.load(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.view {
            return Err(AppError::forbidden("You have no access to this case"));
        }
        // Editors open their own cases without retyping the lock.
        if config.has_password && !perms.edit {
            let Some(hash) = config.password.as_deref() else {
                return Err(AppError::internal("Case lock is set but has no password"));
            };
            let Some(supplied) = password else {
                return Err(AppError::unauthorized("This case requires a password"));
            };
            if !self.hasher.verify_password(supplied, hash)? {
                return Err(AppError::unauthorized("Invalid case password"));
            }
        }
        self.detail(&case, &config, perms).await
    }

    /// Rewrites the case configuration's top-level fields. The whole
    /// document is read, modified, and written back, guarded by the
    /// revision token the caller read.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        update: UpdateCase,
    ) -> AppResult<CaseDetail> {
        reject_static(case_id)?;
        let (case, mut config) = self.load(case_id).await?;
        let perms = self.require_edit(ctx, &case).await?;

        check_revision(&config, update.expected_revision)?;

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(AppError::validation("Case title must not be empty"));
            }
            config.title = title;
        }
        if let Some(description) = update.description {
            config.description = (!description.is_empty()).then_some(description);
        }
        if let Some(password) = update.password {
            // An empty string clears the lock.
            config.password = self.hash_optional(Some(&password))?;
            config.has_password = config.password.is_some();
        }
        config.touch();
        self.assets.write_config(&config).await?;

        let (case, _) = self
            .store
            .upsert_case(
                &config.id,
                &config.title,
                config.description.as_deref(),
                case.creator_id,
            )
            .await?;

        self.detail(&case, &config, perms).await
    }

    /// Replaces the case icon, cleaning up the previous object when its
    /// path changes (a different extension).
    pub async fn replace_icon(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        icon: UploadedFile,
    ) -> AppResult<CaseDetail> {
        reject_static(case_id)?;
        let (case, mut config) = self.load(case_id).await?;
        let perms = self.require_edit(ctx, &case).await?;

        let new_path = self
            .assets
            .write_case_icon(case_id, Some(&icon), &config.title)
            .await?;
        if let Some(old_path) = config.icon_path.as_deref() {
            if old_path != new_path {
                self.assets.delete_tolerant(old_path).await;
                self.url_cache.invalidate(old_path);
            }
        }
        self.url_cache.invalidate(&new_path);
        config.icon_path = Some(new_path);
        config.touch();
        self.assets.write_config(&config).await?;

        self.detail(&case, &config, perms).await
    }

    /// Attaches one supporting document to the case.
    pub async fn add_document(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        file: UploadedFile,
    ) -> AppResult<DocumentView> {
        reject_static(case_id)?;
        let (case, mut config) = self.load(case_id).await?;
        self.require_edit(ctx, &case).await?;

        if config.documents.iter().any(|d| d.name == file.filename) {
            return Err(AppError::conflict(format!(
                "Document '{}' already exists in this case",
                file.filename
            )));
        }
        let document = self.assets.write_document(case_id, &file).await?;
        config.documents.push(document.clone());
        config.touch();
        self.assets.write_config(&config).await?;

        let url = signed_or_none(
            self.assets.objects(),
            &self.url_cache,
            &document.path,
            self.signed_url_ttl,
        )
        .await;
        Ok(DocumentView {
            id: document.id,
            name: document.name,
            url,
        })
    }

    /// Removes one document: config entry plus the stored object.
    pub async fn delete_document(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        document_id: &str,
    ) -> AppResult<()> {
        reject_static(case_id)?;
        let (case, mut config) = self.load(case_id).await?;
        self.require_edit(ctx, &case).await?;

        let Some(position) = config.documents.iter().position(|d| d.id == document_id) else {
            return Err(AppError::not_found(format!(
                "Document '{document_id}' not found in case '{case_id}'"
            )));
        };
        let removed = config.documents.remove(position);
        config.touch();
        self.assets.write_config(&config).await?;

        self.assets.delete_tolerant(&removed.path).await;
        self.url_cache.invalidate(&removed.path);
        Ok(())
    }

    /// Deletes a case: relational row first, then the object fan-out.
    /// Authorization is evaluated from freshly fetched rows so a revoked
    /// grant is respected immediately.
    pub async fn delete(&self, ctx: &RequestContext, case_id: &str) -> AppResult<()> {
        reject_static(case_id)?;
        match self.reconciler.sync_case(case_id).await? {
            Some((case, config)) => {
                let perms = permissions_for(&self.store, &ctx.user, &case).await?;
                if !perms.delete {
                    return Err(AppError::forbidden("You may not delete this case"));
                }
                self.store.delete_case(case_id).await?;
                self.assets.delete_case_assets(&config).await;
                self.url_cache.invalidate_prefix(&paths::case_prefix(case_id));
                info!(case_id, user = %ctx.user.email, "Deleted case");
                Ok(())
            }
            None => {
                // Config gone or unreadable. Clean up a stale row when the
                // caller is allowed to, otherwise report not-found.
                let Some(case) = self.store.find_case(case_id).await? else {
                    return Err(AppError::not_found(format!("Case '{case_id}' not found")));
                };
                let perms = permissions_for(&self.store, &ctx.user, &case).await?;
                if !perms.delete {
                    return Err(AppError::forbidden("You may not delete this case"));
                }
                self.store.delete_case(case_id).await?;
                self.assets.sweep_prefix(&paths::case_prefix(case_id)).await;
                self.url_cache.invalidate_prefix(&paths::case_prefix(case_id));
                info!(case_id, user = %ctx.user.email, "Deleted stale case row");
                Ok(())
            }
        }
    }

    /// Fetches the case's explanation markdown after the access check.
    pub async fn explanation(&self, ctx: &RequestContext, case_id: &str) -> AppResult<String> {
        let (case, config) = self.load(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.view {
            return Err(AppError::forbidden("You have no access to this case"));
        }
        let Some(path) = config.explanation_markdown_path.as_deref() else {
            return Err(AppError::not_found("This case has no explanation"));
        };
        self.assets.read_markdown(path).await
    }

    /// Loads a case's row and config, recreating the row from the config
    /// when it lags behind the object store.
    pub(crate) async fn load(&self, case_id: &str) -> AppResult<(Case, CaseConfig)> {
        if is_static_case_id(case_id) {
            return Err(AppError::not_found(format!("Case '{case_id}' not found")));
        }
        self.reconciler
            .sync_case(case_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case '{case_id}' not found")))
    }

    pub(crate) async fn require_edit(
        &self,
        ctx: &RequestContext,
        case: &Case,
    ) -> AppResult<CasePermissions> {
        let perms = permissions_for(&self.store, &ctx.user, case).await?;
        if !perms.edit {
            return Err(AppError::forbidden("You may not edit this case"));
        }
        Ok(perms)
    }

    /// Builds the client-facing detail view: password hashes redacted,
    /// asset paths exchanged for signed URLs.
    pub(crate) async fn detail(
        &self,
        case: &Case,
        config: &CaseConfig,
        perms: CasePermissions,
    ) -> AppResult<CaseDetail> {
        let icon_url = self.maybe_sign(config.icon_path.as_deref()).await;
        let explanation_url = self
            .maybe_sign(config.explanation_markdown_path.as_deref())
            .await;

        let mut assistants = Vec::with_capacity(config.assistants.len());
        for assistant in &config.assistants {
            let assistant_icon_url = self.maybe_sign(assistant.icon_path.as_deref()).await;
            assistants.push(AssistantView {
                id: assistant.id.clone(),
                case_id: config.id.clone(),
                name: assistant.name.clone(),
                description: assistant.description.clone(),
                icon_url: assistant_icon_url,
                has_password: assistant.has_password,
                is_available_at_start: assistant.is_available_at_start,
                order_index: assistant.order_index,
                locked_label: assistant.locked_label.clone(),
            });
        }

        let mut documents = Vec::with_capacity(config.documents.len());
        for document in &config.documents {
            let url = self.maybe_sign(Some(&document.path)).await;
            documents.push(DocumentView {
                id: document.id.clone(),
                name: document.name.clone(),
                url,
            });
        }

        Ok(CaseDetail {
            id: config.id.clone(),
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            has_password: config.has_password,
            icon_url,
            explanation_url,
            assistants,
            documents,
            created_at: case.created_at,
            updated_at: config.updated_at,
            revision: config.revision,
            permissions: perms,
        })
    }

    async fn maybe_sign(&self, path: Option<&str>) -> Option<String> {
        let path = path?;
        signed_or_none(
            self.assets.objects(),
            &self.url_cache,
            path,
            self.signed_url_ttl,
        )
        .await
    }

    fn hash_optional(&self, password: Option<&str>) -> AppResult<Option<String>> {
        match password {
            Some(p) if !p.is_empty() => Ok(Some(self.hasher.hash_password(p)?)),
            _ => Ok(None),
        }
    }
}

/// Rejects any mutation of a reserved static demo id before store calls.
pub(crate) fn reject_static(case_id: &str) -> AppResult<()> {
    if is_static_case_id(case_id) {
        return Err(AppError::validation(format!(
            "Case id '{case_id}' is reserved for bundled content"
        )));
    }
    Ok(())
}

/// Slug check: the id doubles as an object-store folder name.
fn validate_case_id(case_id: &str) -> AppResult<()> {
    let valid = !case_id.is_empty()
        && case_id.len() <= 64
        && case_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(AppError::validation(format!(
            "Case id '{case_id}' must be lowercase letters, digits, and dashes"
        )));
    }
    Ok(())
}

/// Slug check: the id is spliced into object keys under the case prefix,
/// so the same charset rule applies as for case ids.
pub(crate) fn validate_assistant_id(assistant_id: &str) -> AppResult<()> {
    let valid = !assistant_id.is_empty()
        && assistant_id.len() <= 64
        && assistant_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(AppError::validation(format!(
            "Assistant id '{assistant_id}' must be lowercase letters, digits, and dashes"
        )));
    }
    Ok(())
}

/// Revision guard for config read-modify-write cycles.
pub(crate) fn check_revision(config: &CaseConfig, expected: u64) -> AppResult<()> {
    if config.revision != expected {
        return Err(AppError::conflict(format!(
            "Case '{}' was modified concurrently (revision {} != expected {})",
            config.id, config.revision, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    use casehub_entity::config_doc::DocumentRef;

    use crate::case::NewAssistant;
    use crate::testing::{harness, user_ctx, Harness};

    fn new_assistant(id: &str, prompt: Option<&str>) -> NewAssistant {
        NewAssistant {
            id: id.to_string(),
            name: format!("Assistant {id}"),
            description: None,
            prompt_markdown: prompt.map(str::to_string),
            password: None,
            is_available_at_start: true,
            order_index: 0,
            locked_label: None,
            icon: None,
        }
    }

    fn new_case(id: &str, title: &str) -> NewCase {
        NewCase {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            password: None,
            explanation_markdown: None,
            icon: None,
            assistants: vec![new_assistant("tutor", Some("You are a tutor."))],
            documents: Vec::new(),
        }
    }

    async fn created(h: &Harness) -> RequestContext {
        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        h.cases.create(&ctx, new_case("cs101", "Econ 101")).await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn create_writes_config_row_and_creator_grant() {
        let h = harness().await;
        let ctx = created(&h).await;

        let config = h.assets.read_config("cs101").await.unwrap();
        assert_eq!(config.assistants[0].id, "tutor");
        assert_eq!(config.assistants[0].case_id, "cs101");
        assert_eq!(config.author, "prof.x@example.edu");
        assert_eq!(config.revision, 1);

        let case = h.access.find_case("cs101").await.unwrap().unwrap();
        assert_eq!(case.creator_id, ctx.user_id());
        let grant = h
            .access
            .find_access_grant(ctx.user_id(), "cs101")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grant.role, GrantRole::Professor);
        assert_eq!(h.store.user_count(), 1);

        // Referenced assets were all written before the config.
        assert!(
            h.assets
                .objects()
                .exists(&config.assistants[0].markdown_path)
                .await
                .unwrap()
        );
        assert!(
            h.assets
                .objects()
                .exists(config.icon_path.as_deref().unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn create_requires_the_creation_flag() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "student@example.edu", false, false, false).await;
        let err = h
            .cases
            .create(&ctx, new_case("cs101", "Econ 101"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn create_rejects_missing_prompt_before_any_write() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        let mut input = new_case("cs101", "Econ 101");
        input.assistants.push(new_assistant("mute", None));

        let err = h.cases.create(&ctx, input).await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Validation);
        assert!(err.message.contains("Assistant mute"));
        // Nothing reached either store.
        assert!(h.assets.objects().list("demos/").await.unwrap().is_empty());
        assert!(h.store.snapshot_case_ids().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_assistant_ids_that_leave_the_case_prefix() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        let mut input = new_case("cs101", "Econ 101");
        input
            .assistants
            .push(new_assistant("../../cs999/planted", Some("You escape.")));

        let err = h.cases.create(&ctx, input).await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Validation);
        // No object landed anywhere, least of all under another case.
        assert!(h.assets.objects().list("demos/").await.unwrap().is_empty());
        assert!(h.store.snapshot_case_ids().is_empty());
    }

    #[tokio::test]
    async fn create_conflicts_on_an_existing_id() {
        let h = harness().await;
        let ctx = created(&h).await;
        let err = h
            .cases
            .create(&ctx, new_case("cs101", "Econ 101 again"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn static_ids_are_rejected_before_any_mutation() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "root@example.edu", false, true, true).await;

        let err = h
            .cases
            .create(&ctx, new_case("static-demo", "Bundled"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Validation);
        let err = h.cases.delete(&ctx, "static-econ").await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Validation);
        assert!(h.assets.objects().list("demos/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn password_gate_applies_to_viewers_but_not_editors() {
        let h = harness().await;
        let creator = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        let mut input = new_case("cs101", "Econ 101");
        input.password = Some("opensesame".to_string());
        h.cases.create(&creator, input).await.unwrap();

        let student = user_ctx(&h.access, "student@example.edu", false, false, false).await;
        h.access
            .upsert_access_grant(student.user_id(), "cs101", GrantRole::Student, creator.user_id())
            .await
            .unwrap();

        let err = h.cases.get(&student, "cs101", None).await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Unauthorized);
        let err = h.cases.get(&student, "cs101", Some("wrong")).await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Unauthorized);

        let detail = h.cases.get(&student, "cs101", Some("opensesame")).await.unwrap();
        assert!(detail.has_password);

        // The creator never retypes the lock.
        h.cases.get(&creator, "cs101", None).await.unwrap();
    }

    #[tokio::test]
    async fn detail_redacts_hashes_and_signs_urls() {
        let h = harness().await;
        let ctx = created(&h).await;
        let detail = h.cases.get(&ctx, "cs101", None).await.unwrap();

        assert!(detail.icon_url.is_some());
        assert!(detail.explanation_url.is_some());
        assert_eq!(detail.assistants.len(), 1);
        assert!(detail.assistants[0].icon_url.is_some());
        let json = serde_json::to_string(&detail).unwrap();
        assert!(!json.contains("$argon2"));
    }

    #[tokio::test]
    async fn update_is_guarded_by_the_revision_token() {
        let h = harness().await;
        let ctx = created(&h).await;

        let stale = UpdateCase {
            title: Some("Econ 102".to_string()),
            description: None,
            password: None,
            expected_revision: 7,
        };
        let err = h.cases.update(&ctx, "cs101", stale).await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Conflict);

        let fresh = UpdateCase {
            title: Some("Econ 102".to_string()),
            description: Some("Intermediate".to_string()),
            password: None,
            expected_revision: 1,
        };
        let detail = h.cases.update(&ctx, "cs101", fresh).await.unwrap();
        assert_eq!(detail.title, "Econ 102");
        assert_eq!(detail.revision, 2);
        // The relational projection follows the config.
        let case = h.access.find_case("cs101").await.unwrap().unwrap();
        assert_eq!(case.name, "Econ 102");
    }

    #[tokio::test]
    async fn students_can_read_but_not_delete() {
        let h = harness().await;
        let creator = created(&h).await;

        let student = user_ctx(&h.access, "student@example.edu", false, false, false).await;
        h.access
            .upsert_access_grant(student.user_id(), "cs101", GrantRole::Student, creator.user_id())
            .await
            .unwrap();

        let err = h.cases.delete(&student, "cs101").await.unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Forbidden);
        h.cases.get(&student, "cs101", None).await.unwrap();
    }

    #[tokio::test]
    async fn delete_fans_out_and_tolerates_missing_assets() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        let mut input = new_case("cs101", "Econ 101");
        input.documents.push(UploadedFile {
            filename: "syllabus.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF"),
        });
        h.cases.create(&ctx, input).await.unwrap();

        // Simulate out-of-band loss of one referenced asset.
        let config = h.assets.read_config("cs101").await.unwrap();
        h.assets
            .objects()
            .delete(&config.assistants[0].markdown_path)
            .await
            .unwrap();

        h.cases.delete(&ctx, "cs101").await.unwrap();

        assert!(h.assets.objects().list("demos/cs101/").await.unwrap().is_empty());
        assert!(h.access.find_case("cs101").await.unwrap().is_none());
        assert_eq!(h.store.access_grant_count(), 0);
    }

    #[tokio::test]
    async fn delete_of_a_stale_row_without_config_cleans_up() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let creator = h.access.ensure_user("gone@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs999", "Stale", None, creator.id)
            .await
            .unwrap();

        h.cases.delete(&ctx, "cs999").await.unwrap();
        assert!(h.access.find_case("cs999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn documents_can_be_added_and_removed() {
        let h = harness().await;
        let ctx = created(&h).await;

        let doc = h
            .cases
            .add_document(
                &ctx,
                "cs101",
                UploadedFile {
                    filename: "notes.md".to_string(),
                    content_type: "text/markdown".to_string(),
                    data: Bytes::from_static(b"# Notes"),
                },
            )
            .await
            .unwrap();
        assert!(doc.url.is_some());
        let config = h.assets.read_config("cs101").await.unwrap();
        assert_eq!(config.documents.len(), 1);
        let DocumentRef { path, .. } = config.documents[0].clone();
        assert!(h.assets.objects().exists(&path).await.unwrap());

        h.cases.delete_document(&ctx, "cs101", &doc.id).await.unwrap();
        let config = h.assets.read_config("cs101").await.unwrap();
        assert!(config.documents.is_empty());
        assert!(!h.assets.objects().exists(&path).await.unwrap());
    }

    #[test]
    fn case_ids_are_slugs() {
        assert!(validate_case_id("cs101").is_ok());
        assert!(validate_case_id("econ-intro-2").is_ok());
        assert!(validate_case_id("").is_err());
        assert!(validate_case_id("CS101").is_err());
        assert!(validate_case_id("has space").is_err());
        assert!(validate_case_id("dots.are.out").is_err());
    }

    #[test]
    fn assistant_ids_are_slugs() {
        assert!(validate_assistant_id("tutor").is_ok());
        assert!(validate_assistant_id("examiner-2").is_ok());
        assert!(validate_assistant_id("").is_err());
        assert!(validate_assistant_id("Tutor").is_err());
        assert!(validate_assistant_id("../../cs999/planted").is_err());
        assert!(validate_assistant_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn static_ids_are_rejected() {
        for id in casehub_core::types::STATIC_CASE_IDS {
            assert!(reject_static(id).is_err());
        }
        assert!(reject_static("cs101").is_ok());
    }
}
