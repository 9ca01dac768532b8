//! Assistant CRUD within a case configuration document.
//!
//! Metadata changes are config read-modify-write cycles guarded by the
//! revision token. Prompt-markdown changes are targeted object writes
//! that leave the config document untouched, so the two update paths are
//! deliberately independent.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use casehub_auth::PasswordHasher;
use casehub_cache::SignedUrlCache;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_database::AccessStore;
use casehub_entity::config_doc::{Assistant, CaseConfig};

use super::UpdateAssistant;
use crate::access::permissions_for;
use crate::case::assets::AssetLifecycle;
use crate::case::service::{check_revision, reject_static, validate_assistant_id};
use crate::case::{AssistantView, CaseService, NewAssistant};
use crate::context::RequestContext;
use crate::urls::signed_or_none;

/// Assistant lifecycle operations.
#[derive(Debug, Clone)]
pub struct AssistantService {
    store: Arc<dyn AccessStore>,
    assets: AssetLifecycle,
    cases: CaseService,
    hasher: PasswordHasher,
    url_cache: Arc<SignedUrlCache>,
    signed_url_ttl: Duration,
}

impl AssistantService {
    /// Creates the service over shared stores.
    pub fn new(
        store: Arc<dyn AccessStore>,
        assets: AssetLifecycle,
        cases: CaseService,
        url_cache: Arc<SignedUrlCache>,
        signed_url_ttl: Duration,
    ) -> Self {
        Self {
            store,
            assets,
            cases,
            hasher: PasswordHasher::new(),
            url_cache,
            signed_url_ttl,
        }
    }

    /// Adds an assistant to an existing case.
    pub async fn add(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        input: NewAssistant,
        expected_revision: u64,
    ) -> AppResult<AssistantView> {
        reject_static(case_id)?;
        let (case, mut config) = self.cases.load(case_id).await?;
        self.cases.require_edit(ctx, &case).await?;
        check_revision(&config, expected_revision)?;

        validate_assistant_id(&input.id)?;
        if config.assistant(&input.id).is_some() {
            return Err(AppError::conflict(format!(
                "Assistant '{}' already exists in case '{case_id}'",
                input.id
            )));
        }
        let Some(markdown) = input
            .prompt_markdown
            .as_deref()
            .filter(|m| !m.trim().is_empty())
        else {
            return Err(AppError::validation(format!(
                "Assistant '{}' is missing its prompt content",
                input.name
            )));
        };

        let markdown_path = self
            .assets
            .write_assistant_markdown(case_id, &input.id, markdown)
            .await?;
        let icon_path = self
            .assets
            .write_assistant_icon(case_id, &input.id, input.icon.as_ref(), &input.name)
            .await?;
        let password = match input.password.as_deref() {
            Some(p) if !p.is_empty() => Some(self.hasher.hash_password(p)?),
            _ => None,
        };

        let assistant = Assistant {
            id: input.id.clone(),
            case_id: case_id.to_string(),
            name: input.name,
            description: input.description,
            icon_path: Some(icon_path),
            has_password: password.is_some(),
            password,
            is_available_at_start: input.is_available_at_start,
            order_index: input.order_index,
            markdown_path,
            locked_label: input.locked_label,
        };
        config.assistants.push(assistant);
        config.assistants.sort_by_key(|a| a.order_index);
        config.touch();
        self.assets.write_config(&config).await?;

        info!(case_id, assistant_id = %input.id, "Added assistant");
        let Some(added) = config.assistant(&input.id) else {
            return Err(AppError::internal("Assistant vanished after insertion"));
        };
        Ok(self.view(case_id, added).await)
    }

    /// Updates an assistant's metadata: read the full config, replace the
    /// entry, write the full config back.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        assistant_id: &str,
        update: UpdateAssistant,
    ) -> AppResult<AssistantView> {
        reject_static(case_id)?;
        let (case, mut config) = self.cases.load(case_id).await?;
        self.cases.require_edit(ctx, &case).await?;
        check_revision(&config, update.expected_revision)?;

        let hashed = match update.password {
            // An empty string clears the lock.
            Some(ref p) if p.is_empty() => Some(None),
            Some(ref p) => Some(Some(self.hasher.hash_password(p)?)),
            None => None,
        };

        let Some(assistant) = config.assistant_mut(assistant_id) else {
            return Err(assistant_not_found(case_id, assistant_id));
        };
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Assistant name must not be empty"));
            }
            assistant.name = name;
        }
        if let Some(description) = update.description {
            assistant.description = (!description.is_empty()).then_some(description);
        }
        if let Some(password) = hashed {
            assistant.has_password = password.is_some();
            assistant.password = password;
        }
        if let Some(available) = update.is_available_at_start {
            assistant.is_available_at_start = available;
        }
        if let Some(order_index) = update.order_index {
            assistant.order_index = order_index;
        }
        if let Some(label) = update.locked_label {
            assistant.locked_label = (!label.is_empty()).then_some(label);
        }
        // Legacy documents lack the owning-case field; repair on write.
        assistant.case_id = case_id.to_string();

        config.assistants.sort_by_key(|a| a.order_index);
        config.touch();
        self.assets.write_config(&config).await?;

        let Some(updated) = config.assistant(assistant_id) else {
            return Err(assistant_not_found(case_id, assistant_id));
        };
        Ok(self.view(case_id, updated).await)
    }

    /// Removes an assistant: best-effort asset deletes, then the config
    /// rewrite without its entry.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        assistant_id: &str,
    ) -> AppResult<()> {
        reject_static(case_id)?;
        let (case, mut config) = self.cases.load(case_id).await?;
        self.cases.require_edit(ctx, &case).await?;

        let Some(position) = config.assistants.iter().position(|a| a.id == assistant_id) else {
            return Err(assistant_not_found(case_id, assistant_id));
        };
        let removed = config.assistants.remove(position);
        config.touch();
        self.assets.write_config(&config).await?;

        self.assets.delete_assistant_assets(&removed).await;
        if let Some(icon) = &removed.icon_path {
            self.url_cache.invalidate(icon);
        }
        self.url_cache.invalidate(&removed.markdown_path);
        info!(case_id, assistant_id, "Deleted assistant");
        Ok(())
    }

    /// Fetches an assistant's prompt markdown.
    pub async fn markdown(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        assistant_id: &str,
    ) -> AppResult<String> {
        let (case, config) = self.cases.load(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.view {
            return Err(AppError::forbidden("You have no access to this case"));
        }
        if config.assistant(assistant_id).is_none() {
            return Err(assistant_not_found(case_id, assistant_id));
        }
        self.assets
            .read_assistant_markdown(case_id, assistant_id)
            .await
    }

    /// Rewrites an assistant's prompt markdown. A targeted object write:
    /// the config document is not touched, so concurrent metadata edits
    /// cannot be clobbered by a prompt change.
    pub async fn update_markdown(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        assistant_id: &str,
        content: &str,
    ) -> AppResult<()> {
        reject_static(case_id)?;
        let (case, config) = self.cases.load(case_id).await?;
        self.cases.require_edit(ctx, &case).await?;
        if config.assistant(assistant_id).is_none() {
            return Err(assistant_not_found(case_id, assistant_id));
        }
        if content.trim().is_empty() {
            return Err(AppError::validation("Prompt content must not be empty"));
        }
        self.assets
            .write_assistant_markdown(case_id, assistant_id, content)
            .await?;
        self.url_cache
            .invalidate(&casehub_storage::paths::assistant_markdown_path(
                case_id,
                assistant_id,
            ));
        info!(case_id, assistant_id, "Updated assistant markdown");
        Ok(())
    }

    /// Checks an assistant-lock password, unlocking the assistant for the
    /// caller when it matches.
    pub async fn unlock(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        assistant_id: &str,
        password: &str,
    ) -> AppResult<()> {
        let (case, config) = self.cases.load(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.view {
            return Err(AppError::forbidden("You have no access to this case"));
        }
        let Some(assistant) = config.assistant(assistant_id) else {
            return Err(assistant_not_found(case_id, assistant_id));
        };
        if !assistant.has_password {
            return Ok(());
        }
        let Some(hash) = assistant.password.as_deref() else {
            return Err(AppError::internal(
                "Assistant lock is set but has no password",
            ));
        };
        if !self.hasher.verify_password(password, hash)? {
            return Err(AppError::unauthorized("Invalid assistant password"));
        }
        Ok(())
    }

    /// Looks an assistant up in an already-loaded config.
    pub fn find_in_config<'c>(
        &self,
        config: &'c CaseConfig,
        assistant_id: &str,
    ) -> AppResult<&'c Assistant> {
        config
            .assistant(assistant_id)
            .ok_or_else(|| assistant_not_found(&config.id, assistant_id))
    }

    async fn view(&self, case_id: &str, assistant: &Assistant) -> AssistantView {
        let icon_url = match assistant.icon_path.as_deref() {
            Some(path) => {
                signed_or_none(
                    self.assets.objects(),
                    &self.url_cache,
                    path,
                    self.signed_url_ttl,
                )
                .await
            }
            None => None,
        };
        AssistantView {
            id: assistant.id.clone(),
            case_id: case_id.to_string(),
            name: assistant.name.clone(),
            description: assistant.description.clone(),
            icon_url,
            has_password: assistant.has_password,
            is_available_at_start: assistant.is_available_at_start,
            order_index: assistant.order_index,
            locked_label: assistant.locked_label.clone(),
        }
    }
}

fn assistant_not_found(case_id: &str, assistant_id: &str) -> AppError {
    AppError::not_found(format!(
        "Assistant '{assistant_id}' not found in case '{case_id}'"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use casehub_core::error::ErrorKind;
    use casehub_storage::paths;

    use crate::case::{NewAssistant, NewCase};
    use crate::testing::{harness, user_ctx, Harness};

    fn new_assistant(id: &str, order_index: i32) -> NewAssistant {
        NewAssistant {
            id: id.to_string(),
            name: format!("Assistant {id}"),
            description: None,
            prompt_markdown: Some(format!("You are {id}.")),
            password: None,
            is_available_at_start: true,
            order_index,
            locked_label: None,
            icon: None,
        }
    }

    async fn created(h: &Harness) -> RequestContext {
        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        h.cases
            .create(
                &ctx,
                NewCase {
                    id: "cs101".to_string(),
                    title: "Econ 101".to_string(),
                    description: None,
                    password: None,
                    explanation_markdown: None,
                    icon: None,
                    assistants: vec![new_assistant("tutor", 0)],
                    documents: Vec::new(),
                },
            )
            .await
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn markdown_update_leaves_the_config_byte_identical() {
        let h = harness().await;
        let ctx = created(&h).await;
        let before = h
            .assets
            .objects()
            .get(&paths::config_path("cs101"))
            .await
            .unwrap();

        h.assistants
            .update_markdown(&ctx, "cs101", "tutor", "You are a stricter tutor.")
            .await
            .unwrap();

        let after = h
            .assets
            .objects()
            .get(&paths::config_path("cs101"))
            .await
            .unwrap();
        assert_eq!(before, after);
        let markdown = h.assistants.markdown(&ctx, "cs101", "tutor").await.unwrap();
        assert_eq!(markdown, "You are a stricter tutor.");
    }

    #[tokio::test]
    async fn metadata_update_bumps_the_revision() {
        let h = harness().await;
        let ctx = created(&h).await;

        let view = h
            .assistants
            .update(
                &ctx,
                "cs101",
                "tutor",
                UpdateAssistant {
                    name: Some("Socratic Tutor".to_string()),
                    description: Some("Asks before telling".to_string()),
                    password: None,
                    is_available_at_start: None,
                    order_index: None,
                    locked_label: None,
                    expected_revision: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.name, "Socratic Tutor");

        let config = h.assets.read_config("cs101").await.unwrap();
        assert_eq!(config.revision, 2);

        let stale = h
            .assistants
            .update(
                &ctx,
                "cs101",
                "tutor",
                UpdateAssistant {
                    name: Some("Too late".to_string()),
                    description: None,
                    password: None,
                    is_available_at_start: None,
                    order_index: None,
                    locked_label: None,
                    expected_revision: 1,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(stale.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn adding_keeps_assistants_ordered() {
        let h = harness().await;
        let ctx = created(&h).await;

        h.assistants
            .add(&ctx, "cs101", new_assistant("examiner", -1), 1)
            .await
            .unwrap();

        let config = h.assets.read_config("cs101").await.unwrap();
        let ids: Vec<&str> = config.assistants.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["examiner", "tutor"]);
    }

    #[tokio::test]
    async fn add_rejects_ids_that_escape_the_case_prefix() {
        let h = harness().await;
        let ctx = created(&h).await;

        let err = h
            .assistants
            .add(&ctx, "cs101", new_assistant("../../cs999/planted", 1), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        // Nothing landed outside the owning case's folder.
        assert!(h.assets.objects().list("demos/cs999/").await.unwrap().is_empty());
        let config = h.assets.read_config("cs101").await.unwrap();
        assert_eq!(config.assistants.len(), 1);
    }

    #[tokio::test]
    async fn add_requires_prompt_content() {
        let h = harness().await;
        let ctx = created(&h).await;

        let mut input = new_assistant("mute", 1);
        input.prompt_markdown = Some("   ".to_string());
        let err = h.assistants.add(&ctx, "cs101", input, 1).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn delete_tolerates_already_missing_assets() {
        let h = harness().await;
        let ctx = created(&h).await;

        let config = h.assets.read_config("cs101").await.unwrap();
        let tutor = config.assistant("tutor").unwrap().clone();
        h.assets
            .objects()
            .delete(tutor.icon_path.as_deref().unwrap())
            .await
            .unwrap();

        h.assistants.delete(&ctx, "cs101", "tutor").await.unwrap();

        let config = h.assets.read_config("cs101").await.unwrap();
        assert!(config.assistants.is_empty());
        assert!(!h.assets.objects().exists(&tutor.markdown_path).await.unwrap());
    }

    #[tokio::test]
    async fn delete_of_an_unknown_assistant_is_not_found() {
        let h = harness().await;
        let ctx = created(&h).await;
        let err = h.assistants.delete(&ctx, "cs101", "ghost").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn students_cannot_touch_assistant_metadata() {
        let h = harness().await;
        let creator = created(&h).await;
        let student = user_ctx(&h.access, "student@example.edu", false, false, false).await;
        h.store
            .upsert_access_grant(
                student.user_id(),
                "cs101",
                casehub_entity::grant::GrantRole::Student,
                creator.user_id(),
            )
            .await
            .unwrap();

        let err = h
            .assistants
            .update_markdown(&student, "cs101", "tutor", "hacked")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        // Reading stays allowed.
        h.assistants.markdown(&student, "cs101", "tutor").await.unwrap();
    }

    #[tokio::test]
    async fn unlock_checks_the_assistant_password() {
        let h = harness().await;
        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, true).await;
        let mut locked = new_assistant("oracle", 0);
        locked.password = Some("secret".to_string());
        h.cases
            .create(
                &ctx,
                NewCase {
                    id: "cs101".to_string(),
                    title: "Econ 101".to_string(),
                    description: None,
                    password: None,
                    explanation_markdown: None,
                    icon: None,
                    assistants: vec![locked],
                    documents: Vec::new(),
                },
            )
            .await
            .unwrap();

        let err = h
            .assistants
            .unlock(&ctx, "cs101", "oracle", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        h.assistants.unlock(&ctx, "cs101", "oracle", "secret").await.unwrap();
    }
}
