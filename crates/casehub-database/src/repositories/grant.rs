//! Access and admin grant repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::grant::{AccessGrant, AdminGrant, GrantRole};

/// Repository for the two grant relations.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: PgPool,
}

impl GrantRepository {
    /// Create a new grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create-or-overwrite an access grant for a (user, case) pair.
    ///
    /// The primary key on (user_id, case_id) enforces the at-most-one
    /// invariant; re-granting updates role and granter in place.
    pub async fn upsert_access(
        &self,
        user_id: Uuid,
        case_id: &str,
        role: GrantRole,
        granted_by: Uuid,
    ) -> AppResult<AccessGrant> {
        sqlx::query_as::<_, AccessGrant>(
            r#"
            INSERT INTO access_grants (user_id, case_id, role, granted_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, case_id) DO UPDATE SET
                role = EXCLUDED.role,
                granted_by = EXCLUDED.granted_by,
                granted_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(case_id)
        .bind(role)
        .bind(granted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert access grant", e))
    }

    /// Find the access grant a user holds on a case, if any.
    pub async fn find_access(
        &self,
        user_id: Uuid,
        case_id: &str,
    ) -> AppResult<Option<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>(
            "SELECT * FROM access_grants WHERE user_id = $1 AND case_id = $2",
        )
        .bind(user_id)
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find access grant", e))
    }

    /// List every access grant on a case.
    pub async fn access_for_case(&self, case_id: &str) -> AppResult<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>(
            "SELECT * FROM access_grants WHERE case_id = $1 ORDER BY granted_at",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list case grants", e))
    }

    /// List every access grant a user holds.
    pub async fn access_for_user(&self, user_id: Uuid) -> AppResult<Vec<AccessGrant>> {
        sqlx::query_as::<_, AccessGrant>("SELECT * FROM access_grants WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list user grants", e)
            })
    }

    /// Remove an access grant. Returns whether one existed.
    pub async fn revoke_access(&self, user_id: Uuid, case_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM access_grants WHERE user_id = $1 AND case_id = $2")
            .bind(user_id)
            .bind(case_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to revoke access grant", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Create an admin grant (idempotent on the (user, case) key).
    pub async fn upsert_admin(
        &self,
        user_id: Uuid,
        case_id: &str,
        granted_by: Uuid,
    ) -> AppResult<AdminGrant> {
        sqlx::query_as::<_, AdminGrant>(
            r#"
            INSERT INTO admin_grants (user_id, case_id, granted_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, case_id) DO UPDATE SET
                granted_by = EXCLUDED.granted_by,
                granted_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(case_id)
        .bind(granted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert admin grant", e))
    }

    /// List the admin grants a user holds.
    pub async fn admin_for_user(&self, user_id: Uuid) -> AppResult<Vec<AdminGrant>> {
        sqlx::query_as::<_, AdminGrant>("SELECT * FROM admin_grants WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list admin grants", e)
            })
    }

    /// List the admin grants on a case.
    pub async fn admin_for_case(&self, case_id: &str) -> AppResult<Vec<AdminGrant>> {
        sqlx::query_as::<_, AdminGrant>("SELECT * FROM admin_grants WHERE case_id = $1")
            .bind(case_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list case admin grants", e)
            })
    }

    /// Remove an admin grant. Returns whether one existed.
    pub async fn revoke_admin(&self, user_id: Uuid, case_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM admin_grants WHERE user_id = $1 AND case_id = $2")
            .bind(user_id)
            .bind(case_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to revoke admin grant", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
