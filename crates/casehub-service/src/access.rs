//! Permission resolution against the access store.

use std::sync::Arc;

use casehub_auth::access::{CasePermissions, decide};
use casehub_core::result::AppResult;
use casehub_database::AccessStore;
use casehub_entity::case::Case;
use casehub_entity::user::User;

/// Compute what `user` may do with `case`, from freshly fetched grants.
///
/// Always queried live so that a revoked grant is respected on the very
/// next request.
pub async fn permissions_for(
    store: &Arc<dyn AccessStore>,
    user: &User,
    case: &Case,
) -> AppResult<CasePermissions> {
    let has_admin_grant = store
        .admin_grants_for_case(&case.id)
        .await?
        .iter()
        .any(|g| g.user_id == user.id);

    let access_role = store
        .find_access_grant(user.id, &case.id)
        .await?
        .map(|g| g.role);

    Ok(decide(user, case.creator_id, has_admin_grant, access_role))
}
