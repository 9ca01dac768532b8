//! Signed object delivery for locally stored assets.
//!
//! Only meaningful for the local storage provider; S3 deployments hand
//! out presigned URLs that never touch this process.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use casehub_core::error::AppError;

use crate::dto::request::SignedObjectQuery;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /objects/{*path} — verifies the signature, then serves the bytes.
pub async fn get_object(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<SignedObjectQuery>,
) -> ApiResult<Response> {
    let signer = state
        .storage_manager
        .signer()
        .ok_or_else(|| AppError::not_found("Object delivery is not available"))?;
    if !signer.verify(&path, query.expires, &query.sig) {
        return Err(AppError::forbidden("Invalid or expired object signature").into());
    }

    let bytes = state.storage_manager.store().get(&path).await?;
    let content_type = content_type_for(&path);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or_default();
    match extension.to_ascii_lowercase().as_str() {
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "md" => "text/markdown; charset=utf-8",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
