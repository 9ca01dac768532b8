//! Supporting-document management.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;

use casehub_core::error::AppError;
use casehub_service::case::DocumentView;

use crate::dto::request::CasePasswordQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::CurrentUser;
use crate::handlers::cases::first_file;
use crate::state::AppState;

/// GET /api/cases/{id}/documents — document list with signed URLs.
pub async fn list_documents(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    Query(query): Query<CasePasswordQuery>,
) -> ApiResult<Json<ApiResponse<Vec<DocumentView>>>> {
    let detail = state
        .cases
        .get(&user.0, &case_id, query.password.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(detail.documents)))
}

/// POST /api/cases/{id}/documents — multipart document upload.
pub async fn upload_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<DocumentView>>)> {
    let file = first_file(multipart)
        .await?
        .ok_or_else(|| AppError::validation("Expected a document file part"))?;
    let view = state.cases.add_document(&user.0, &case_id, file).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// DELETE /api/cases/{id}/documents/{docId}.
pub async fn delete_document(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, document_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .cases
        .delete_document(&user.0, &case_id, &document_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
