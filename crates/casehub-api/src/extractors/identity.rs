//! `CurrentUser` extractor — resolves the forwarded identity headers and
//! ensures the user row for this request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use casehub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The acting user's context, available to every handler.
///
/// The identity provider in front of CaseHub authenticates the request
/// and forwards the principal's email in a trusted header; this extractor
/// turns that header into an ensured user row. The configured bootstrap
/// operator is promoted to super-admin on first sight.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestContext);

impl std::ops::Deref for CurrentUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(state.identity.email_header())
            .and_then(|v| v.to_str().ok());
        let display_name = parts
            .headers
            .get(state.identity.display_name_header())
            .and_then(|v| v.to_str().ok());

        let principal = state.identity.resolve(email, display_name)?;

        let mut user = state
            .store
            .ensure_user(&principal.email, principal.display_name.as_deref())
            .await?;

        if !user.is_super_admin && state.identity.is_bootstrap_super_admin(&user.email) {
            state.store.set_super_admin(user.id).await?;
            user.is_super_admin = true;
            tracing::info!(email = %user.email, "Bootstrapped super-admin");
        }

        Ok(CurrentUser(RequestContext::new(user)))
    }
}
