//! Assistant management within a case.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use validator::Validate;

use casehub_core::error::AppError;
use casehub_service::assistant::UpdateAssistant;
use casehub_service::case::{AssistantView, NewAssistant};

use crate::dto::request::{AddAssistantRequest, UnlockRequest, UpdateMarkdownRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// POST /api/cases/{id}/assistants — add an assistant.
///
/// Icon uploads for added assistants go through the icon-replacement
/// endpoint afterwards; this accepts JSON only.
pub async fn add_assistant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    Json(body): Json<AddAssistantRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AssistantView>>)> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let a = body.assistant;
    let input = NewAssistant {
        id: a.id,
        name: a.name,
        description: a.description,
        prompt_markdown: a.prompt_markdown,
        password: a.password,
        is_available_at_start: a.is_available_at_start,
        order_index: a.order_index,
        locked_label: a.locked_label,
        icon: None,
    };
    let view = state
        .assistants
        .add(&user.0, &case_id, input, body.expected_revision)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// PUT /api/cases/{id}/assistants/{aid} — metadata update.
pub async fn update_assistant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, assistant_id)): Path<(String, String)>,
    Json(update): Json<UpdateAssistant>,
) -> ApiResult<Json<ApiResponse<AssistantView>>> {
    let view = state
        .assistants
        .update(&user.0, &case_id, &assistant_id, update)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// DELETE /api/cases/{id}/assistants/{aid}.
pub async fn delete_assistant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, assistant_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .assistants
        .delete(&user.0, &case_id, &assistant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cases/{id}/assistants/{aid}/markdown — the prompt markdown.
pub async fn get_markdown(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, assistant_id)): Path<(String, String)>,
) -> ApiResult<String> {
    Ok(state
        .assistants
        .markdown(&user.0, &case_id, &assistant_id)
        .await?)
}

/// PUT /api/cases/{id}/assistants/{aid}/markdown — targeted prompt write.
pub async fn update_markdown(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, assistant_id)): Path<(String, String)>,
    Json(body): Json<UpdateMarkdownRequest>,
) -> ApiResult<StatusCode> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    state
        .assistants
        .update_markdown(&user.0, &case_id, &assistant_id, &body.content)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cases/{id}/assistants/{aid}/unlock — assistant password check.
pub async fn unlock_assistant(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((case_id, assistant_id)): Path<(String, String)>,
    Json(body): Json<UnlockRequest>,
) -> ApiResult<StatusCode> {
    state
        .assistants
        .unlock(&user.0, &case_id, &assistant_id, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
