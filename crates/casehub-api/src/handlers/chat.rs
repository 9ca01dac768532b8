//! Chat streaming endpoint.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::Response;

use casehub_core::error::AppError;
use casehub_service::chat::ChatRequest;

use crate::error::ApiResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// POST /api/chat — forwards the prompt upstream and relays the SSE stream.
pub async fn stream_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Response> {
    let stream = state.chat.stream(&user.0, request).await?;
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Failed to build stream response: {e}")))?;
    Ok(response)
}
