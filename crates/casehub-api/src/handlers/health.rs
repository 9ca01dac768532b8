//! Health endpoint.

use axum::Json;
use axum::extract::State;

use casehub_core::traits::cache::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health — liveness of the database, object store, and cache.
///
/// Always returns 200; degraded components are reported in the body so
/// orchestrators can alert without flapping the whole service.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.db.health_check().await.unwrap_or(false);
    let storage = state
        .storage_manager
        .store()
        .health_check()
        .await
        .unwrap_or(false);
    let cache = state.cache.health_check().await.unwrap_or(false);

    let status = if database && storage && cache {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        storage,
        cache,
    })
}
