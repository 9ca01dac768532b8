//! Application wiring — builds services, state, and the Axum server.

use std::sync::Arc;

use casehub_auth::identity::IdentityResolver;
use casehub_cache::{MemoryCacheProvider, SignedUrlCache};
use casehub_core::config::AppConfig;
use casehub_core::error::AppError;
use casehub_database::{AccessStore, DatabasePool, PgAccessStore};
use casehub_service::assistant::AssistantService;
use casehub_service::case::{AssetLifecycle, CaseService, Reconciler};
use casehub_service::chat::ChatService;
use casehub_service::user::UserAdminService;
use casehub_storage::manager::StorageManager;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the CaseHub server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db: DatabasePool) -> Result<(), AppError> {
    tracing::info!("Starting CaseHub server...");

    let cache = Arc::new(MemoryCacheProvider::new(
        &config.cache.memory,
        config.cache.default_ttl_seconds,
    ));

    tracing::info!(provider = %config.storage.provider, "Initializing object store");
    let storage_manager = Arc::new(StorageManager::from_config(&config.storage).await?);
    let signed_url_ttl = storage_manager.signed_url_ttl();
    let url_cache = Arc::new(SignedUrlCache::new(signed_url_ttl));

    let store: Arc<dyn AccessStore> = Arc::new(PgAccessStore::new(db.pool().clone()));
    let identity = Arc::new(IdentityResolver::new(&config.identity));

    let assets = AssetLifecycle::new(storage_manager.store(), Arc::clone(&cache));
    let reconciler = Reconciler::new(
        Arc::clone(&store),
        assets.clone(),
        Arc::clone(&url_cache),
        signed_url_ttl,
    );
    let cases = CaseService::new(
        Arc::clone(&store),
        assets.clone(),
        reconciler.clone(),
        Arc::clone(&url_cache),
        signed_url_ttl,
    );
    let assistants = AssistantService::new(
        Arc::clone(&store),
        assets,
        cases.clone(),
        Arc::clone(&url_cache),
        signed_url_ttl,
    );
    let users = UserAdminService::new(Arc::clone(&store));
    let chat = ChatService::new(Arc::clone(&store), cases.clone(), &config.chat)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        db,
        store,
        storage_manager,
        cache,
        url_cache,
        identity,
        reconciler,
        cases,
        assistants,
        users,
        chat,
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CaseHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
