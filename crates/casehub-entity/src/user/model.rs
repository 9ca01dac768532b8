//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A known identity in the CaseHub system.
///
/// Users are created lazily: on first sign-in (the identity provider
/// forwards an email we have not seen) or on first administrative
/// reference (a grant naming an email that has no row yet).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Email address — the identity key, unique.
    pub email: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Whether the user may hold per-case admin grants.
    pub is_admin: bool,
    /// Whether the user has unconditional rights over every case.
    pub is_super_admin: bool,
    /// Whether the user may create new cases.
    pub can_create_cases: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may create cases (admins always may).
    pub fn may_create_cases(&self) -> bool {
        self.can_create_cases || self.is_admin || self.is_super_admin
    }
}

/// Flag updates applied by administrative user management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserFlags {
    /// New admin flag, if changing.
    pub is_admin: Option<bool>,
    /// New super-admin flag, if changing (super-admin-only operation).
    pub is_super_admin: Option<bool>,
    /// New case-creation flag, if changing.
    pub can_create_cases: Option<bool>,
}
