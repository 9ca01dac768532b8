//! Case listing, creation, detail, update, and deletion.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use validator::Validate;

use casehub_core::error::AppError;
use casehub_service::case::{CaseDetail, CaseSummary, NewAssistant, NewCase, UpdateCase, UploadedFile};

use crate::dto::request::{CasePasswordQuery, CreateCaseRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// Multipart field carrying the case configuration JSON.
const CONFIG_FIELD: &str = "config";
/// Multipart field carrying the case icon.
const ICON_FIELD: &str = "icon";
/// Prefix for per-assistant icon fields, followed by the assistant id.
const ASSISTANT_ICON_PREFIX: &str = "assistantIcon:";
/// Multipart field carrying supporting documents (repeatable).
const DOCUMENT_FIELD: &str = "documents";
/// Header fallback for the case-lock password.
const CASE_PASSWORD_HEADER: &str = "x-case-password";

/// GET /api/cases — reconcile and list cases visible to the caller.
pub async fn list_cases(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<CaseSummary>>>> {
    let cases = state.reconciler.reconcile(&user.0).await?;
    Ok(Json(ApiResponse::ok(cases)))
}

/// POST /api/cases — multipart create.
pub async fn create_case(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<CaseDetail>>)> {
    let input = parse_create_multipart(multipart).await?;
    let detail = state.cases.create(&user.0, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(detail))))
}

/// GET /api/cases/{id} — full detail with signed asset URLs.
pub async fn get_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    Query(query): Query<CasePasswordQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<CaseDetail>>> {
    let password = query.password.or_else(|| {
        headers
            .get(CASE_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    });
    let detail = state
        .cases
        .get(&user.0, &case_id, password.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// PUT /api/cases/{id} — revision-checked config update.
pub async fn update_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    Json(update): Json<UpdateCase>,
) -> ApiResult<Json<ApiResponse<CaseDetail>>> {
    let detail = state.cases.update(&user.0, &case_id, update).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// DELETE /api/cases/{id} — full fan-out deletion.
pub async fn delete_case(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.cases.delete(&user.0, &case_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/cases/{id}/icon — multipart icon replacement.
pub async fn replace_icon(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<ApiResponse<CaseDetail>>> {
    let icon = first_file(multipart)
        .await?
        .ok_or_else(|| AppError::validation("Expected an icon file part"))?;
    let detail = state.cases.replace_icon(&user.0, &case_id, icon).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// GET /api/cases/{id}/explanation — the case explanation markdown.
pub async fn get_explanation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(case_id): Path<String>,
) -> ApiResult<String> {
    Ok(state.cases.explanation(&user.0, &case_id).await?)
}

/// Pulls the config JSON and every file part out of a create request.
async fn parse_create_multipart(mut multipart: Multipart) -> Result<NewCase, AppError> {
    let mut request: Option<CreateCaseRequest> = None;
    let mut icon: Option<UploadedFile> = None;
    let mut assistant_icons: Vec<(String, UploadedFile)> = Vec::new();
    let mut documents: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        if name == CONFIG_FIELD {
            let raw = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Unreadable config part: {e}")))?;
            let parsed: CreateCaseRequest = serde_json::from_slice(&raw)?;
            parsed
                .validate()
                .map_err(|e| AppError::validation(e.to_string()))?;
            request = Some(parsed);
            continue;
        }

        let file = read_file_field(field).await?;
        if name == ICON_FIELD {
            icon = Some(file);
        } else if let Some(assistant_id) = name.strip_prefix(ASSISTANT_ICON_PREFIX) {
            assistant_icons.push((assistant_id.to_string(), file));
        } else if name == DOCUMENT_FIELD {
            documents.push(file);
        }
        // Unknown field names are ignored.
    }

    let request = request
        .ok_or_else(|| AppError::validation(format!("Missing '{CONFIG_FIELD}' multipart part")))?;

    let assistants = request
        .assistants
        .into_iter()
        .map(|a| {
            let assistant_icon = assistant_icons
                .iter()
                .find(|(id, _)| *id == a.id)
                .map(|(_, file)| file.clone());
            NewAssistant {
                id: a.id,
                name: a.name,
                description: a.description,
                prompt_markdown: a.prompt_markdown,
                password: a.password,
                is_available_at_start: a.is_available_at_start,
                order_index: a.order_index,
                locked_label: a.locked_label,
                icon: assistant_icon,
            }
        })
        .collect();

    Ok(NewCase {
        id: request.id,
        title: request.title,
        description: request.description,
        password: request.password,
        explanation_markdown: request.explanation_markdown,
        icon,
        assistants,
        documents,
    })
}

/// Reads one multipart file field into memory.
pub(crate) async fn read_file_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<UploadedFile, AppError> {
    let filename = field
        .file_name()
        .map(String::from)
        .ok_or_else(|| AppError::validation("File part is missing a filename"))?;
    let content_type = field
        .content_type()
        .map(String::from)
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::validation(format!("Unreadable file part: {e}")))?;
    Ok(UploadedFile {
        filename,
        content_type,
        data,
    })
}

/// Reads the first file part of a multipart body, if any.
pub(crate) async fn first_file(
    mut multipart: Multipart,
) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        if field.file_name().is_some() {
            return Ok(Some(read_file_field(field).await?));
        }
    }
    Ok(None)
}
