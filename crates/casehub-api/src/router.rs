//! Route definitions for the CaseHub HTTP API.
//!
//! All REST routes are organized by domain and mounted under `/api`;
//! signed-object delivery lives at `/objects` outside the API prefix so
//! asset URLs stay short. The router receives `AppState` and passes it
//! to every handler via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(case_routes())
        .merge(assistant_routes())
        .merge(document_routes())
        .merge(chat_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let object_routes =
        Router::new().route("/objects/{*path}", get(handlers::objects::get_object));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(object_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Case listing, creation, metadata, icon, and explanation endpoints.
fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/cases", get(handlers::cases::list_cases))
        .route("/cases", post(handlers::cases::create_case))
        .route("/cases/{id}", get(handlers::cases::get_case))
        .route("/cases/{id}", put(handlers::cases::update_case))
        .route("/cases/{id}", delete(handlers::cases::delete_case))
        .route("/cases/{id}/icon", put(handlers::cases::replace_icon))
        .route(
            "/cases/{id}/explanation",
            get(handlers::cases::get_explanation),
        )
}

/// Assistant lifecycle and markdown endpoints, nested under a case.
fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{id}/assistants",
            post(handlers::assistants::add_assistant),
        )
        .route(
            "/cases/{id}/assistants/{assistant_id}",
            put(handlers::assistants::update_assistant),
        )
        .route(
            "/cases/{id}/assistants/{assistant_id}",
            delete(handlers::assistants::delete_assistant),
        )
        .route(
            "/cases/{id}/assistants/{assistant_id}/markdown",
            get(handlers::assistants::get_markdown),
        )
        .route(
            "/cases/{id}/assistants/{assistant_id}/markdown",
            put(handlers::assistants::update_markdown),
        )
        .route(
            "/cases/{id}/assistants/{assistant_id}/unlock",
            post(handlers::assistants::unlock_assistant),
        )
}

/// Case document endpoints.
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cases/{id}/documents",
            get(handlers::documents::list_documents),
        )
        .route(
            "/cases/{id}/documents",
            post(handlers::documents::upload_document),
        )
        .route(
            "/cases/{id}/documents/{document_id}",
            delete(handlers::documents::delete_document),
        )
}

/// The chat relay endpoint.
fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(handlers::chat::stream_chat))
}

/// User and grant administration.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route(
            "/admin/users/{user_id}/flags",
            put(handlers::admin::update_user_flags),
        )
        .route(
            "/admin/users/{user_id}",
            delete(handlers::admin::delete_user),
        )
        .route(
            "/admin/cases/{id}/grants",
            get(handlers::admin::list_grants),
        )
        .route(
            "/admin/cases/{id}/grants",
            post(handlers::admin::grant_access),
        )
        .route(
            "/admin/cases/{id}/grants/{user_id}",
            delete(handlers::admin::revoke_access),
        )
        .route(
            "/admin/cases/{id}/admins",
            post(handlers::admin::grant_admin),
        )
        .route(
            "/admin/cases/{id}/admins/{user_id}",
            delete(handlers::admin::revoke_admin),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    use axum::http::{HeaderName, HeaderValue, Method};
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<HeaderName> = cors_config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
