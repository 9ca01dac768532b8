//! Application state shared across all handlers.

use std::sync::Arc;

use casehub_auth::identity::IdentityResolver;
use casehub_cache::{MemoryCacheProvider, SignedUrlCache};
use casehub_core::config::AppConfig;
use casehub_database::{AccessStore, DatabasePool};
use casehub_service::assistant::AssistantService;
use casehub_service::case::{CaseService, Reconciler};
use casehub_service::chat::ChatService;
use casehub_service::user::UserAdminService;
use casehub_storage::manager::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool (kept for health probes; services go through the store).
    pub db: DatabasePool,
    /// Relational access store.
    pub store: Arc<dyn AccessStore>,
    /// Object store provider manager.
    pub storage_manager: Arc<StorageManager>,
    /// General-purpose in-memory cache.
    pub cache: Arc<MemoryCacheProvider>,
    /// Signed-URL cache.
    pub url_cache: Arc<SignedUrlCache>,
    /// Identity header resolver.
    pub identity: Arc<IdentityResolver>,
    /// Reconciliation engine.
    pub reconciler: Reconciler,
    /// Case lifecycle service.
    pub cases: CaseService,
    /// Assistant service.
    pub assistants: AssistantService,
    /// User and grant administration.
    pub users: UserAdminService,
    /// Chat completion proxy.
    pub chat: ChatService,
}
