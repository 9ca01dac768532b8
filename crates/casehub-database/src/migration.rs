//! Embedded migration runner.

use sqlx::PgPool;
use tracing::info;

use casehub_core::error::{AppError, ErrorKind};

/// Applies any pending migrations from the workspace `migrations/` dir.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
        })?;

    info!("Schema is up to date");
    Ok(())
}
