//! User roster and grant administration.
//!
//! Visibility is scoped: a super-admin sees the full roster, a
//! case-scoped admin only sees users holding grants on cases that admin
//! manages. Grant writes re-check rights against freshly fetched rows.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_database::AccessStore;
use casehub_entity::grant::{AccessGrant, AdminGrant, GrantRole};
use casehub_entity::user::{UpdateUserFlags, User};

use crate::access::permissions_for;
use crate::context::RequestContext;

/// Administrative operations over users and grants.
#[derive(Debug, Clone)]
pub struct UserAdminService {
    store: Arc<dyn AccessStore>,
}

impl UserAdminService {
    /// Creates the service over the access store.
    pub fn new(store: Arc<dyn AccessStore>) -> Self {
        Self { store }
    }

    /// Lists the users visible to the acting admin.
    ///
    /// Super-admins get the full roster. A case-scoped admin only gets
    /// users holding grants on the cases covered by their admin grants,
    /// never everyone.
    pub async fn list_users(&self, ctx: &RequestContext) -> AppResult<Vec<User>> {
        if ctx.is_super_admin() {
            return self.store.list_users().await;
        }
        if !ctx.is_admin() {
            return Err(AppError::forbidden("You may not manage users"));
        }
        let managed: Vec<String> = self
            .store
            .admin_grants_for_user(ctx.user_id())
            .await?
            .into_iter()
            .map(|g| g.case_id)
            .collect();
        if managed.is_empty() {
            return Ok(Vec::new());
        }
        self.store.list_users_with_grants_on(&managed).await
    }

    /// Updates a user's flags. Admin and super-admin flags may only be
    /// changed by a super-admin; `can_create_cases` may also be granted
    /// by a case-scoped admin.
    pub async fn update_flags(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        flags: UpdateUserFlags,
    ) -> AppResult<User> {
        let touches_admin_flags = flags.is_admin.is_some() || flags.is_super_admin.is_some();
        if touches_admin_flags && !ctx.is_super_admin() {
            return Err(AppError::forbidden(
                "Only a super-admin may change admin flags",
            ));
        }
        if !ctx.is_super_admin() && !ctx.is_admin() {
            return Err(AppError::forbidden("You may not manage users"));
        }
        if user_id == ctx.user_id() && flags.is_super_admin == Some(false) {
            return Err(AppError::validation(
                "You may not remove your own super-admin flag",
            ));
        }
        let updated = self.store.update_user_flags(user_id, &flags).await?;
        info!(user_id = %user_id, by = %ctx.user.email, "Updated user flags");
        Ok(updated)
    }

    /// Removes a user entirely. Super-admin only, never oneself. Grants
    /// cascade with the row.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<()> {
        if !ctx.is_super_admin() {
            return Err(AppError::forbidden("Only a super-admin may delete users"));
        }
        if user_id == ctx.user_id() {
            return Err(AppError::validation("You may not delete yourself"));
        }
        self.store.delete_user(user_id).await?;
        info!(user_id = %user_id, by = %ctx.user.email, "Deleted user");
        Ok(())
    }

    /// Grants a user access to a case (creating the user row from the
    /// email when necessary). Requires edit rights on the case. Repeat
    /// grants overwrite the role rather than piling up rows.
    pub async fn grant_access(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        email: &str,
        role: GrantRole,
    ) -> AppResult<AccessGrant> {
        let case = self.require_case(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.edit {
            return Err(AppError::forbidden(
                "You may not manage access to this case",
            ));
        }
        let user = self.store.ensure_user(email, None).await?;
        let grant = self
            .store
            .upsert_access_grant(user.id, case_id, role, ctx.user_id())
            .await?;
        info!(case_id, email, role = %role, by = %ctx.user.email, "Granted access");
        Ok(grant)
    }

    /// Revokes a user's access grant on a case.
    pub async fn revoke_access(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        user_id: Uuid,
    ) -> AppResult<()> {
        let case = self.require_case(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.edit {
            return Err(AppError::forbidden(
                "You may not manage access to this case",
            ));
        }
        if !self.store.revoke_access_grant(user_id, case_id).await? {
            return Err(AppError::not_found(format!(
                "No access grant for that user on case '{case_id}'"
            )));
        }
        info!(case_id, user_id = %user_id, by = %ctx.user.email, "Revoked access");
        Ok(())
    }

    /// Lists the access grants on one case.
    pub async fn access_grants(
        &self,
        ctx: &RequestContext,
        case_id: &str,
    ) -> AppResult<Vec<AccessGrant>> {
        let case = self.require_case(case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.edit {
            return Err(AppError::forbidden(
                "You may not manage access to this case",
            ));
        }
        self.store.access_grants_for_case(case_id).await
    }

    /// Makes a user a case-scoped admin. Super-admin only, and the target
    /// must already hold the admin flag for the grant to confer anything.
    pub async fn grant_admin(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        email: &str,
    ) -> AppResult<AdminGrant> {
        if !ctx.is_super_admin() {
            return Err(AppError::forbidden(
                "Only a super-admin may assign case admins",
            ));
        }
        self.require_case(case_id).await?;
        let user = self.store.ensure_user(email, None).await?;
        if !user.is_admin {
            return Err(AppError::validation(format!(
                "'{email}' does not hold the admin flag"
            )));
        }
        let grant = self
            .store
            .upsert_admin_grant(user.id, case_id, ctx.user_id())
            .await?;
        info!(case_id, email, by = %ctx.user.email, "Granted case admin");
        Ok(grant)
    }

    /// Revokes a case-scoped admin grant. Super-admin only.
    pub async fn revoke_admin(
        &self,
        ctx: &RequestContext,
        case_id: &str,
        user_id: Uuid,
    ) -> AppResult<()> {
        if !ctx.is_super_admin() {
            return Err(AppError::forbidden(
                "Only a super-admin may remove case admins",
            ));
        }
        if !self.store.revoke_admin_grant(user_id, case_id).await? {
            return Err(AppError::not_found(format!(
                "No admin grant for that user on case '{case_id}'"
            )));
        }
        info!(case_id, user_id = %user_id, by = %ctx.user.email, "Revoked case admin");
        Ok(())
    }

    async fn require_case(&self, case_id: &str) -> AppResult<casehub_entity::case::Case> {
        self.store
            .find_case(case_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case '{case_id}' not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use casehub_core::error::ErrorKind;

    use crate::testing::{harness, user_ctx};

    #[tokio::test]
    async fn repeated_grants_keep_one_row_with_the_latest_role() {
        let h = harness().await;
        let root = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let creator = h.access.ensure_user("prof.x@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs101", "Econ 101", None, creator.id)
            .await
            .unwrap();
        let users = UserAdminService::new(h.access.clone());

        users
            .grant_access(&root, "cs101", "student@example.edu", GrantRole::Student)
            .await
            .unwrap();
        let grant = users
            .grant_access(&root, "cs101", "student@example.edu", GrantRole::Professor)
            .await
            .unwrap();

        assert_eq!(grant.role, GrantRole::Professor);
        let grants = h.access.access_grants_for_case("cs101").await.unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].role, GrantRole::Professor);
    }

    #[tokio::test]
    async fn admin_listing_is_scoped_to_managed_cases() {
        let h = harness().await;
        let root = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let creator = h.access.ensure_user("prof.x@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs101", "Econ 101", None, creator.id)
            .await
            .unwrap();
        h.access
            .upsert_case("cs202", "Law 202", None, creator.id)
            .await
            .unwrap();
        let users = UserAdminService::new(h.access.clone());

        // One student per case; the admin only manages cs101.
        users
            .grant_access(&root, "cs101", "alice@example.edu", GrantRole::Student)
            .await
            .unwrap();
        users
            .grant_access(&root, "cs202", "bob@example.edu", GrantRole::Student)
            .await
            .unwrap();

        let admin = user_ctx(&h.access, "admin@example.edu", true, false, false).await;
        users
            .grant_admin(&root, "cs101", "admin@example.edu")
            .await
            .unwrap();

        let visible = users.list_users(&admin).await.unwrap();
        let emails: Vec<&str> = visible.iter().map(|u| u.email.as_str()).collect();
        assert!(emails.contains(&"alice@example.edu"));
        assert!(!emails.contains(&"bob@example.edu"));

        let everyone = users.list_users(&root).await.unwrap();
        assert!(everyone.len() >= 4);
    }

    #[tokio::test]
    async fn scoped_listing_includes_admin_grant_holders() {
        let h = harness().await;
        let root = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let creator = h.access.ensure_user("prof.x@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs101", "Econ 101", None, creator.id)
            .await
            .unwrap();
        let users = UserAdminService::new(h.access.clone());

        let admin = user_ctx(&h.access, "admin@example.edu", true, false, false).await;
        users
            .grant_admin(&root, "cs101", "admin@example.edu")
            .await
            .unwrap();
        // A co-admin with no access grant of their own.
        user_ctx(&h.access, "co-admin@example.edu", true, false, false).await;
        users
            .grant_admin(&root, "cs101", "co-admin@example.edu")
            .await
            .unwrap();

        let visible = users.list_users(&admin).await.unwrap();
        let emails: Vec<&str> = visible.iter().map(|u| u.email.as_str()).collect();
        assert!(emails.contains(&"co-admin@example.edu"));
    }

    #[tokio::test]
    async fn non_admins_may_not_list_users() {
        let h = harness().await;
        let stranger = user_ctx(&h.access, "stranger@example.edu", false, false, false).await;
        let users = UserAdminService::new(h.access.clone());
        let err = users.list_users(&stranger).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn only_super_admins_change_admin_flags() {
        let h = harness().await;
        let admin = user_ctx(&h.access, "admin@example.edu", true, false, false).await;
        let target = h.access.ensure_user("target@example.edu", None).await.unwrap();
        let users = UserAdminService::new(h.access.clone());

        let err = users
            .update_flags(
                &admin,
                target.id,
                UpdateUserFlags {
                    is_admin: Some(true),
                    is_super_admin: None,
                    can_create_cases: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        // But a case admin may hand out the creation flag.
        let updated = users
            .update_flags(
                &admin,
                target.id,
                UpdateUserFlags {
                    is_admin: None,
                    is_super_admin: None,
                    can_create_cases: Some(true),
                },
            )
            .await
            .unwrap();
        assert!(updated.can_create_cases);
    }

    #[tokio::test]
    async fn super_admins_cannot_demote_or_delete_themselves() {
        let h = harness().await;
        let root = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let users = UserAdminService::new(h.access.clone());

        let err = users
            .update_flags(
                &root,
                root.user_id(),
                UpdateUserFlags {
                    is_admin: None,
                    is_super_admin: Some(false),
                    can_create_cases: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = users.delete_user(&root, root.user_id()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn admin_grants_require_the_admin_flag_on_the_target() {
        let h = harness().await;
        let root = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let creator = h.access.ensure_user("prof.x@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs101", "Econ 101", None, creator.id)
            .await
            .unwrap();
        let users = UserAdminService::new(h.access.clone());

        h.access.ensure_user("plain@example.edu", None).await.unwrap();
        let err = users
            .grant_admin(&root, "cs101", "plain@example.edu")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_their_grants() {
        let h = harness().await;
        let root = user_ctx(&h.access, "root@example.edu", false, true, false).await;
        let creator = h.access.ensure_user("prof.x@example.edu", None).await.unwrap();
        h.access
            .upsert_case("cs101", "Econ 101", None, creator.id)
            .await
            .unwrap();
        let users = UserAdminService::new(h.access.clone());
        let grant = users
            .grant_access(&root, "cs101", "student@example.edu", GrantRole::Student)
            .await
            .unwrap();

        users.delete_user(&root, grant.user_id).await.unwrap();
        assert!(
            h.access
                .find_access_grant(grant.user_id, "cs101")
                .await
                .unwrap()
                .is_none()
        );
    }
}
