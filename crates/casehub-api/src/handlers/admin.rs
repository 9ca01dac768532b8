//! Administrative user and grant endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use casehub_core::error::AppError;
use casehub_entity::user::UpdateUserFlags;

use crate::dto::request::{GrantAccessRequest, GrantAdminRequest, UpdateFlagsRequest};
use crate::dto::response::{ApiResponse, GrantResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// GET /api/admin/users — the roster visible to the acting admin.
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.users.list_users(&user.0).await?;
    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(users)))
}

/// PUT /api/admin/users/{id}/flags.
pub async fn update_user_flags(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateFlagsRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let flags = UpdateUserFlags {
        is_admin: body.is_admin,
        is_super_admin: body.is_super_admin,
        can_create_cases: body.can_create_cases,
    };
    let updated = state.users.update_flags(&user.0, user_id, flags).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(updated))))
}

/// DELETE /api/admin/users/{id}.
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.users.delete_user(&user.0, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/cases/{id}/grants — the access grants on a case.
pub async fn list_grants(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<GrantResponse>>>> {
    let grants = state.users.access_grants(&user.0, &case_id).await?;
    let grants = grants.into_iter().map(GrantResponse::from).collect();
    Ok(Json(ApiResponse::ok(grants)))
}

/// POST /api/admin/cases/{id}/grants — grant STUDENT or PROFESSOR access.
pub async fn grant_access(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    Json(body): Json<GrantAccessRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<GrantResponse>>)> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let grant = state
        .users
        .grant_access(&user.0, &case_id, &body.email, body.role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(grant.into()))))
}

/// DELETE /api/admin/cases/{id}/grants/{userId}.
pub async fn revoke_access(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, user_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state.users.revoke_access(&user.0, &case_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/cases/{id}/admins — assign a case-scoped admin.
pub async fn grant_admin(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    Json(body): Json<GrantAdminRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<GrantResponse>>)> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let grant = state
        .users
        .grant_admin(&user.0, &case_id, &body.email)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(grant.into()))))
}

/// DELETE /api/admin/cases/{id}/admins/{userId}.
pub async fn revoke_admin(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, user_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    state.users.revoke_admin(&user.0, &case_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
