//! Grant entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::GrantRole;

/// A (user, case, role) record conferring STUDENT or PROFESSOR view access.
///
/// At most one grant exists per (user, case) pair: re-granting overwrites
/// the role and granter, it never duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessGrant {
    /// The user holding the grant.
    pub user_id: Uuid,
    /// The case the grant applies to.
    pub case_id: String,
    /// STUDENT or PROFESSOR.
    pub role: GrantRole,
    /// The user who issued the grant.
    pub granted_by: Uuid,
    /// When the grant was issued (or last overwritten).
    pub granted_at: DateTime<Utc>,
}

/// A (user, case) record conferring management (edit/delete) rights over
/// one specific case, independent of STUDENT/PROFESSOR access.
///
/// Only a super-admin may create these, and only for users flagged admin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminGrant {
    /// The admin user holding the grant.
    pub user_id: Uuid,
    /// The case the grant applies to.
    pub case_id: String,
    /// The super-admin who issued the grant.
    pub granted_by: Uuid,
    /// When the grant was issued.
    pub granted_at: DateTime<Utc>,
}
