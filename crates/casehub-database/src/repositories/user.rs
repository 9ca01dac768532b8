//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::user::{UpdateUserFlags, User};

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (emails are stored lowercased).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Upsert a user by email, creating the row lazily on first reference.
    ///
    /// A fresh display name overwrites a stale one; an absent display name
    /// never erases an existing one.
    pub async fn ensure_by_email(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email.to_lowercase())
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user", e))
    }

    /// List every user, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// List users holding an access or admin grant on any of the given
    /// cases.
    ///
    /// This is the scoped roster a non-super admin is allowed to see.
    pub async fn find_with_grants_on(&self, case_ids: &[String]) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            WHERE EXISTS (
                SELECT 1 FROM access_grants g
                WHERE g.user_id = u.id AND g.case_id = ANY($1)
            ) OR EXISTS (
                SELECT 1 FROM admin_grants a
                WHERE a.user_id = u.id AND a.case_id = ANY($1)
            )
            ORDER BY u.created_at DESC
            "#,
        )
        .bind(case_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list scoped users", e))
    }

    /// Apply flag updates to a user row.
    pub async fn update_flags(&self, id: Uuid, flags: &UpdateUserFlags) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                is_admin = COALESCE($2, is_admin),
                is_super_admin = COALESCE($3, is_super_admin),
                can_create_cases = COALESCE($4, can_create_cases),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(flags.is_admin)
        .bind(flags.is_super_admin)
        .bind(flags.can_create_cases)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user flags", e))?
        .ok_or_else(|| AppError::not_found(format!("User not found: {id}")))
    }

    /// Set the super-admin flag on a user row. Used by the bootstrap step.
    pub async fn set_super_admin(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_super_admin = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set super-admin flag", e)
            })?;
        Ok(())
    }

    /// Delete a user, cascading their grants.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User not found: {id}")));
        }
        Ok(())
    }
}
