//! Reconciliation between the object store and the relational access store.
//!
//! The object store is ground truth for which cases exist. The relational
//! store only projects that truth for access control, so on every listing
//! this engine re-derives the projection: upserting rows for discovered
//! cases, granting the creator on first sight, and sweeping rows whose
//! config object is gone. One malformed case never aborts the pass.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use casehub_cache::SignedUrlCache;
use casehub_core::result::AppResult;
use casehub_core::types::is_static_case_id;
use casehub_database::AccessStore;
use casehub_entity::case::Case;
use casehub_entity::config_doc::CaseConfig;
use casehub_entity::grant::GrantRole;
use casehub_storage::paths;

use super::assets::AssetLifecycle;
use super::CaseSummary;
use crate::access::permissions_for;
use crate::context::RequestContext;
use crate::urls::signed_or_none;

/// Keeps the relational store convergent with the object store.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: Arc<dyn AccessStore>,
    assets: AssetLifecycle,
    url_cache: Arc<SignedUrlCache>,
    signed_url_ttl: Duration,
}

impl Reconciler {
    /// Creates a reconciler over the given stores.
    pub fn new(
        store: Arc<dyn AccessStore>,
        assets: AssetLifecycle,
        url_cache: Arc<SignedUrlCache>,
        signed_url_ttl: Duration,
    ) -> Self {
        Self {
            store,
            assets,
            url_cache,
            signed_url_ttl,
        }
    }

    /// Runs one reconciliation pass and returns the case list visible to
    /// the acting user.
    ///
    /// Runs inline on every listing request. Idempotent: a second pass
    /// with no object-store changes produces only no-op upserts.
    pub async fn reconcile(&self, ctx: &RequestContext) -> AppResult<Vec<CaseSummary>> {
        let discovered = self
            .assets
            .objects()
            .list_prefixes(&format!("{}/", paths::CASE_ROOT))
            .await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut reconciled: Vec<(Case, CaseConfig)> = Vec::new();

        for case_id in discovered {
            if is_static_case_id(&case_id) {
                continue;
            }
            if !seen.insert(case_id.clone()) {
                continue;
            }
            match self.sync_case(&case_id).await {
                Ok(Some(pair)) => reconciled.push(pair),
                Ok(None) => {}
                Err(e) => {
                    // Isolated: one case's failure never aborts the pass.
                    // The id stays in `seen` so a transient store error
                    // cannot get the row swept as an orphan.
                    warn!(case_id, error = %e, "Reconciliation failed for case, skipping");
                }
            }
        }

        if ctx.is_super_admin() {
            self.ensure_super_admin_grants(ctx, &reconciled).await;
        }

        self.sweep_orphans(&seen).await?;

        let mut summaries = Vec::with_capacity(reconciled.len());
        for (case, config) in &reconciled {
            let perms = permissions_for(&self.store, &ctx.user, case).await?;
            if !perms.view {
                continue;
            }
            let icon_url = match &config.icon_path {
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
            summaries.push(CaseSummary {
                id: case.id.clone(),
                name: case.name.clone(),
                description: case.description.clone(),
                has_password: config.has_password,
                icon_url,
                permissions: perms,
            });
        }

        Ok(summaries)
    }

    /// Reconciles one discovered case folder into the relational store.
    ///
    /// Returns `Ok(None)` when the config object is missing or malformed;
    /// the caller skips the case and the orphan sweep will pick up any
    /// stale row on a later pass.
    pub async fn sync_case(&self, case_id: &str) -> AppResult<Option<(Case, CaseConfig)>> {
        let config = match self.assets.read_config(case_id).await {
            Ok(config) => config,
            Err(e) => {
                warn!(case_id, error = %e, "Unreadable case config, skipping");
                return Ok(None);
            }
        };
        if config.id != case_id {
            warn!(
                case_id,
                config_id = %config.id,
                "Config id does not match its folder, skipping"
            );
            return Ok(None);
        }

        let creator = self.store.ensure_user(&config.author, None).await?;
        let (case, inserted) = self
            .store
            .upsert_case(
                case_id,
                &config.title,
                config.description.as_deref(),
                creator.id,
            )
            .await?;

        if inserted {
            info!(case_id, creator = %creator.email, "New case discovered, granting creator");
            self.store
                .upsert_access_grant(creator.id, case_id, GrantRole::Professor, creator.id)
                .await?;
        }

        Ok(Some((case, config)))
    }

    /// Super-admins always gain access through reconciliation, never lose it.
    async fn ensure_super_admin_grants(
        &self,
        ctx: &RequestContext,
        reconciled: &[(Case, CaseConfig)],
    ) {
        for (case, _) in reconciled {
            if let Err(e) = self
                .store
                .upsert_access_grant(ctx.user_id(), &case.id, GrantRole::Professor, ctx.user_id())
                .await
            {
                warn!(case_id = %case.id, error = %e, "Super-admin self-grant failed, skipping");
            }
        }
    }

    /// Deletes relational rows whose config object was not discovered
    /// this pass. Grants cascade with the row. One failed delete never
    /// aborts cleanup of the others.
    async fn sweep_orphans(&self, discovered: &HashSet<String>) -> AppResult<()> {
        let known = self.store.case_ids().await?;
        for case_id in known {
            if discovered.contains(&case_id) || is_static_case_id(&case_id) {
                continue;
            }
            match self.store.delete_case(&case_id).await {
                Ok(true) => {
                    info!(case_id, "Swept orphaned case row");
                    self.url_cache.invalidate_prefix(&paths::case_prefix(&case_id));
                }
                Ok(false) => debug!(case_id, "Orphan already gone"),
                Err(e) => warn!(case_id, error = %e, "Orphan sweep failed for case, skipping"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;

    use crate::testing::{harness, user_ctx};

    fn config(case_id: &str, author: &str) -> CaseConfig {
        let now = Utc::now();
        CaseConfig {
            id: case_id.to_string(),
            title: format!("Title for {case_id}"),
            description: None,
            author: author.to_string(),
            icon_path: None,
            has_password: false,
            password: None,
            explanation_markdown_path: None,
            assistants: Vec::new(),
            documents: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 1,
        }
    }

    #[tokio::test]
    async fn discovering_a_case_creates_row_user_and_creator_grant() {
        let h = harness().await;
        h.assets
            .write_config(&config("cs101", "prof.x@example.edu"))
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "viewer@example.edu", false, false, false).await;
        h.reconciler.reconcile(&ctx).await.unwrap();

        let case = h.access.find_case("cs101").await.unwrap().unwrap();
        let author = h
            .access
            .find_user_by_email("prof.x@example.edu")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(case.creator_id, author.id);
        let grant = h
            .access
            .find_access_grant(author.id, "cs101")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grant.role, GrantRole::Professor);
    }

    #[tokio::test]
    async fn reconciliation_is_idempotent() {
        let h = harness().await;
        h.assets
            .write_config(&config("cs101", "prof.x@example.edu"))
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "prof.x@example.edu", false, false, false).await;
        let first = h.reconciler.reconcile(&ctx).await.unwrap();
        let users = h.store.user_count();
        let grants = h.store.access_grant_count();
        let cases = h.store.snapshot_case_ids();

        let second = h.reconciler.reconcile(&ctx).await.unwrap();
        assert_eq!(h.store.user_count(), users);
        assert_eq!(h.store.access_grant_count(), grants);
        assert_eq!(h.store.snapshot_case_ids(), cases);
        assert_eq!(
            first.iter().map(|c| &c.id).collect::<Vec<_>>(),
            second.iter().map(|c| &c.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn orphaned_rows_are_swept() {
        let h = harness().await;
        h.assets
            .write_config(&config("cs101", "prof.x@example.edu"))
            .await
            .unwrap();
        let stale_creator = h.access.ensure_user("gone@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs999", "Stale", None, stale_creator.id)
            .await
            .unwrap();
        h.access
            .upsert_access_grant(stale_creator.id, "cs999", GrantRole::Professor, stale_creator.id)
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let listed = h.reconciler.reconcile(&ctx).await.unwrap();

        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        assert!(ids.contains(&"cs101"));
        assert!(!ids.contains(&"cs999"));
        assert!(h.access.find_case("cs999").await.unwrap().is_none());
        assert!(
            h.access
                .find_access_grant(stale_creator.id, "cs999")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn super_admin_gains_a_grant_and_sees_everything() {
        let h = harness().await;
        h.assets
            .write_config(&config("cs101", "prof.x@example.edu"))
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let listed = h.reconciler.reconcile(&ctx).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert!(listed[0].permissions.delete);
        let grant = h
            .access
            .find_access_grant(ctx.user_id(), "cs101")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grant.role, GrantRole::Professor);
    }

    #[tokio::test]
    async fn malformed_config_skips_the_case_but_not_the_pass() {
        let h = harness().await;
        h.assets
            .write_config(&config("cs-good", "prof.x@example.edu"))
            .await
            .unwrap();
        h.assets
            .objects()
            .put(
                "demos/cs-bad/config.json",
                Bytes::from_static(b"{ not json"),
                "application/json",
            )
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let listed = h.reconciler.reconcile(&ctx).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "cs-good");
        assert!(h.access.find_case("cs-bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_is_filtered_by_view_permission() {
        let h = harness().await;
        h.assets
            .write_config(&config("cs101", "prof.x@example.edu"))
            .await
            .unwrap();

        let stranger = user_ctx(&h.access, "stranger@example.edu", false, false, false).await;
        assert!(h.reconciler.reconcile(&stranger).await.unwrap().is_empty());

        let student = user_ctx(&h.access, "student@example.edu", false, false, false).await;
        h.access
            .upsert_access_grant(student.user_id(), "cs101", GrantRole::Student, student.user_id())
            .await
            .unwrap();
        let listed = h.reconciler.reconcile(&student).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].permissions.view);
        assert!(!listed[0].permissions.edit);
    }

    #[tokio::test]
    async fn static_ids_never_touch_the_relational_store() {
        let h = harness().await;
        h.assets
            .write_config(&config("static-demo", "prof.x@example.edu"))
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let listed = h.reconciler.reconcile(&ctx).await.unwrap();

        assert!(listed.is_empty());
        assert!(h.access.find_case("static-demo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn config_folder_mismatch_is_skipped() {
        let h = harness().await;
        let mut mismatched = config("other-id", "prof.x@example.edu");
        mismatched.id = "other-id".to_string();
        let json = serde_json::to_vec(&mismatched).unwrap();
        h.assets
            .objects()
            .put("demos/cs101/config.json", Bytes::from(json), "application/json")
            .await
            .unwrap();

        let ctx = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let listed = h.reconciler.reconcile(&ctx).await.unwrap();
        assert!(listed.is_empty());
        assert!(h.access.find_case("cs101").await.unwrap().is_none());
        assert!(h.access.find_case("other-id").await.unwrap().is_none());
    }
}
