//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use casehub_entity::grant::{AccessGrant, AdminGrant, GrantRole};
use casehub_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User id.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Whether the user holds the admin flag.
    pub is_admin: bool,
    /// Whether the user is a super-admin.
    pub is_super_admin: bool,
    /// Whether the user may create cases.
    pub can_create_cases: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            is_admin: user.is_admin,
            is_super_admin: user.is_super_admin,
            can_create_cases: user.can_create_cases,
            created_at: user.created_at,
        }
    }
}

/// Access grant as returned by the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResponse {
    /// The granted user.
    pub user_id: Uuid,
    /// The case.
    pub case_id: String,
    /// The granted role (absent for admin grants).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<GrantRole>,
    /// Who issued the grant.
    pub granted_by: Uuid,
    /// When it was issued.
    pub granted_at: DateTime<Utc>,
}

impl From<AccessGrant> for GrantResponse {
    fn from(grant: AccessGrant) -> Self {
        Self {
            user_id: grant.user_id,
            case_id: grant.case_id,
            role: Some(grant.role),
            granted_by: grant.granted_by,
            granted_at: grant.granted_at,
        }
    }
}

impl From<AdminGrant> for GrantResponse {
    fn from(grant: AdminGrant) -> Self {
        Self {
            user_id: grant.user_id,
            case_id: grant.case_id,
            role: None,
            granted_by: grant.granted_by,
            granted_at: grant.granted_at,
        }
    }
}

/// Health probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status: "ok" or "degraded".
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: bool,
    /// Object store reachability.
    pub storage: bool,
    /// Cache reachability.
    pub cache: bool,
}
