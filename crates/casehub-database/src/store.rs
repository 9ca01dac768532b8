//! The relational access store.
//!
//! [`AccessStore`] is the single seam the service layer talks to for users,
//! cases, and grants. [`PgAccessStore`] is the production implementation
//! over the per-entity repositories; tests substitute an in-memory fake.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::result::AppResult;
use casehub_entity::case::Case;
use casehub_entity::grant::{AccessGrant, AdminGrant, GrantRole};
use casehub_entity::user::{UpdateUserFlags, User};

use crate::repositories::{CaseRepository, GrantRepository, UserRepository};

/// Authoritative record of users, cases, and per-user-per-case grants.
///
/// Upserts are idempotent and keyed by natural identity (email for users,
/// slug id for cases, composite key for grants), so concurrent
/// reconciliation passes cannot duplicate rows. User and case deletion
/// cascade to grants.
#[async_trait]
pub trait AccessStore: Send + Sync + std::fmt::Debug + 'static {
    /// Upsert a user by email, creating the row on first reference.
    async fn ensure_user(&self, email: &str, display_name: Option<&str>) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List every user.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// List users holding an access or admin grant on any of the given cases.
    async fn list_users_with_grants_on(&self, case_ids: &[String]) -> AppResult<Vec<User>>;

    /// Apply flag updates to a user.
    async fn update_user_flags(&self, id: Uuid, flags: &UpdateUserFlags) -> AppResult<User>;

    /// Set the persisted super-admin flag (bootstrap path).
    async fn set_super_admin(&self, id: Uuid) -> AppResult<()>;

    /// Delete a user, cascading their grants.
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Find a case row.
    async fn find_case(&self, id: &str) -> AppResult<Option<Case>>;

    /// List all known case ids.
    async fn case_ids(&self) -> AppResult<Vec<String>>;

    /// Fetch several case rows by id.
    async fn find_cases(&self, ids: &[String]) -> AppResult<Vec<Case>>;

    /// Create-or-update a case row; returns whether it was newly created.
    async fn upsert_case(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        creator_id: Uuid,
    ) -> AppResult<(Case, bool)>;

    /// Delete a case row (cascading grants). Returns whether one existed.
    async fn delete_case(&self, id: &str) -> AppResult<bool>;

    /// Create-or-overwrite an access grant.
    async fn upsert_access_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
        role: GrantRole,
        granted_by: Uuid,
    ) -> AppResult<AccessGrant>;

    /// Find the access grant a user holds on a case, if any.
    async fn find_access_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
    ) -> AppResult<Option<AccessGrant>>;

    /// List the access grants on a case.
    async fn access_grants_for_case(&self, case_id: &str) -> AppResult<Vec<AccessGrant>>;

    /// List the access grants a user holds.
    async fn access_grants_for_user(&self, user_id: Uuid) -> AppResult<Vec<AccessGrant>>;

    /// Remove an access grant. Returns whether one existed.
    async fn revoke_access_grant(&self, user_id: Uuid, case_id: &str) -> AppResult<bool>;

    /// Create an admin grant (idempotent).
    async fn upsert_admin_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
        granted_by: Uuid,
    ) -> AppResult<AdminGrant>;

    /// List the admin grants a user holds.
    async fn admin_grants_for_user(&self, user_id: Uuid) -> AppResult<Vec<AdminGrant>>;

    /// List the admin grants on a case.
    async fn admin_grants_for_case(&self, case_id: &str) -> AppResult<Vec<AdminGrant>>;

    /// Remove an admin grant. Returns whether one existed.
    async fn revoke_admin_grant(&self, user_id: Uuid, case_id: &str) -> AppResult<bool>;
}

/// PostgreSQL-backed [`AccessStore`].
#[derive(Debug, Clone)]
pub struct PgAccessStore {
    users: UserRepository,
    cases: CaseRepository,
    grants: GrantRepository,
}

impl PgAccessStore {
    /// Create the store over a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            cases: CaseRepository::new(pool.clone()),
            grants: GrantRepository::new(pool),
        }
    }
}

#[async_trait]
impl AccessStore for PgAccessStore {
    async fn ensure_user(&self, email: &str, display_name: Option<&str>) -> AppResult<User> {
        self.users.ensure_by_email(email, display_name).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    async fn list_users_with_grants_on(&self, case_ids: &[String]) -> AppResult<Vec<User>> {
        self.users.find_with_grants_on(case_ids).await
    }

    async fn update_user_flags(&self, id: Uuid, flags: &UpdateUserFlags) -> AppResult<User> {
        self.users.update_flags(id, flags).await
    }

    async fn set_super_admin(&self, id: Uuid) -> AppResult<()> {
        self.users.set_super_admin(id).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await
    }

    async fn find_case(&self, id: &str) -> AppResult<Option<Case>> {
        self.cases.find_by_id(id).await
    }

    async fn case_ids(&self) -> AppResult<Vec<String>> {
        self.cases.all_ids().await
    }

    async fn find_cases(&self, ids: &[String]) -> AppResult<Vec<Case>> {
        self.cases.find_by_ids(ids).await
    }

    async fn upsert_case(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        creator_id: Uuid,
    ) -> AppResult<(Case, bool)> {
        self.cases.upsert(id, name, description, creator_id).await
    }

    async fn delete_case(&self, id: &str) -> AppResult<bool> {
        self.cases.delete(id).await
    }

    async fn upsert_access_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
        role: GrantRole,
        granted_by: Uuid,
    ) -> AppResult<AccessGrant> {
        self.grants
            .upsert_access(user_id, case_id, role, granted_by)
            .await
    }

    async fn find_access_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
    ) -> AppResult<Option<AccessGrant>> {
        self.grants.find_access(user_id, case_id).await
    }

    async fn access_grants_for_case(&self, case_id: &str) -> AppResult<Vec<AccessGrant>> {
        self.grants.access_for_case(case_id).await
    }

    async fn access_grants_for_user(&self, user_id: Uuid) -> AppResult<Vec<AccessGrant>> {
        self.grants.access_for_user(user_id).await
    }

    async fn revoke_access_grant(&self, user_id: Uuid, case_id: &str) -> AppResult<bool> {
        self.grants.revoke_access(user_id, case_id).await
    }

    async fn upsert_admin_grant(
        &self,
        user_id: Uuid,
        case_id: &str,
        granted_by: Uuid,
    ) -> AppResult<AdminGrant> {
        self.grants.upsert_admin(user_id, case_id, granted_by).await
    }

    async fn admin_grants_for_user(&self, user_id: Uuid) -> AppResult<Vec<AdminGrant>> {
        self.grants.admin_for_user(user_id).await
    }

    async fn admin_grants_for_case(&self, case_id: &str) -> AppResult<Vec<AdminGrant>> {
        self.grants.admin_for_case(case_id).await
    }

    async fn revoke_admin_grant(&self, user_id: Uuid, case_id: &str) -> AppResult<bool> {
        self.grants.revoke_admin(user_id, case_id).await
    }
}
