//! Forwarding chat requests to the external completion service.
//!
//! The completion service owns the model protocol; this service only
//! authorizes the (case, assistant) pair and pipes the SSE byte stream
//! back to the caller untouched.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

use casehub_core::config::chat::ChatConfig;
use casehub_core::error::AppError;
use casehub_core::result::AppResult;
use casehub_database::AccessStore;

use super::ChatRequest;
use crate::access::permissions_for;
use crate::case::CaseService;
use crate::context::RequestContext;

/// How long to wait for the upstream service to accept a request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Streams chat completions from the configured upstream service.
#[derive(Debug, Clone)]
pub struct ChatService {
    store: Arc<dyn AccessStore>,
    cases: CaseService,
    http: reqwest::Client,
    completion_url: String,
}

impl ChatService {
    /// Creates the service with a shared HTTP client.
    pub fn new(store: Arc<dyn AccessStore>, cases: CaseService, config: &ChatConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            store,
            cases,
            http,
            completion_url: config.completion_url.clone(),
        })
    }

    /// Authorizes the request and returns the upstream SSE byte stream.
    pub async fn stream(
        &self,
        ctx: &RequestContext,
        request: ChatRequest,
    ) -> AppResult<BoxStream<'static, AppResult<bytes::Bytes>>> {
        if request.prompt.trim().is_empty() {
            return Err(AppError::validation("Prompt must not be empty"));
        }
        let (case, config) = self.cases.load(&request.case_id).await?;
        let perms = permissions_for(&self.store, &ctx.user, &case).await?;
        if !perms.view {
            return Err(AppError::forbidden("You have no access to this case"));
        }
        if config.assistant(&request.assistant_id).is_none() {
            return Err(AppError::not_found(format!(
                "Assistant '{}' not found in case '{}'",
                request.assistant_id, request.case_id
            )));
        }

        debug!(
            case_id = %request.case_id,
            assistant_id = %request.assistant_id,
            "Forwarding chat request upstream"
        );
        let response = self
            .http
            .post(&self.completion_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(format!("Chat completion service unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Chat completion service returned {}",
                response.status()
            )));
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                AppError::external_service(format!("Chat stream interrupted: {e}"))
            })
        });
        Ok(stream.boxed())
    }
}
