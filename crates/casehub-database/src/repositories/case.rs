//! Case repository implementation.

use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::case::Case;

/// Repository for the relational case projection.
#[derive(Debug, Clone)]
pub struct CaseRepository {
    pool: PgPool,
}

impl CaseRepository {
    /// Create a new case repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a case by its slug id.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Case>> {
        sqlx::query_as::<_, Case>("SELECT * FROM cases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find case", e))
    }

    /// List all known case ids.
    pub async fn all_ids(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT id FROM cases")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list case ids", e))
    }

    /// Fetch several cases by id.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Case>> {
        sqlx::query_as::<_, Case>("SELECT * FROM cases WHERE id = ANY($1) ORDER BY created_at")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch cases", e))
    }

    /// Create-or-update a case keyed by its slug id.
    ///
    /// Returns the row and whether it was newly created. Existing rows keep
    /// their creator; only the denormalized display fields are refreshed.
    /// Idempotent, so concurrent reconciliation passes are safe.
    pub async fn upsert(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        creator_id: Uuid,
    ) -> AppResult<(Case, bool)> {
        let row = sqlx::query(
            r#"
            INSERT INTO cases (id, name, description, creator_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert case", e))?;

        // xmax = 0 marks a freshly inserted tuple.
        let inserted: bool = row.get("inserted");
        let case = Case::from_row(&row)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to map case row", e))?;
        Ok((case, inserted))
    }

    /// Delete a case row, cascading its grants. Missing rows are tolerated.
    ///
    /// Returns whether a row was actually removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete case", e))?;
        Ok(result.rows_affected() > 0)
    }
}
