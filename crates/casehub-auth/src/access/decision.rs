//! The (user, case) permission decision.
//!
//! Pure functions over already-fetched rows: callers fetch the user, the
//! case's creator, and the relevant grants, then ask for the decision.
//! Nothing here touches a store, so revocation takes effect the moment a
//! caller re-fetches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use casehub_entity::grant::GrantRole;
use casehub_entity::user::User;

/// What a user may do with one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasePermissions {
    /// May see the case in listings and open its assistants.
    pub view: bool,
    /// May edit the case configuration and its assistants.
    pub edit: bool,
    /// May delete the case.
    pub delete: bool,
}

impl CasePermissions {
    /// Full rights.
    pub const ALL: Self = Self {
        view: true,
        edit: true,
        delete: true,
    };

    /// View only.
    pub const VIEW: Self = Self {
        view: true,
        edit: false,
        delete: false,
    };

    /// No rights.
    pub const NONE: Self = Self {
        view: false,
        edit: false,
        delete: false,
    };
}

/// Decide what `user` may do with a case.
///
/// Precedence, first match wins:
/// 1. super-admin — full rights over every case
/// 2. creator — full rights over their own cases
/// 3. admin-grant holder — full rights over the granted case only
/// 4. access-grant holder (STUDENT or PROFESSOR) — view only
/// 5. otherwise — nothing; listings silently omit the case, detail and
///    delete endpoints return forbidden
pub fn decide(
    user: &User,
    creator_id: Uuid,
    has_admin_grant: bool,
    access_role: Option<GrantRole>,
) -> CasePermissions {
    if user.is_super_admin {
        return CasePermissions::ALL;
    }
    if user.id == creator_id {
        return CasePermissions::ALL;
    }
    if user.is_admin && has_admin_grant {
        return CasePermissions::ALL;
    }
    if access_role.is_some() {
        return CasePermissions::VIEW;
    }
    CasePermissions::NONE
}
