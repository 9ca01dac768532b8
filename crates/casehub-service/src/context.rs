//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use casehub_entity::user::User;

/// Context for the current authenticated request.
///
/// Built by the API layer after the principal's user row has been ensured,
/// and passed into service methods so that every operation knows *who* is
/// acting with their current flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's row, freshly ensured for this request.
    pub user: User,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user: User) -> Self {
        Self {
            user,
            request_time: Utc::now(),
        }
    }

    /// The acting user's id.
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Whether the acting user is a super-admin.
    pub fn is_super_admin(&self) -> bool {
        self.user.is_super_admin
    }

    /// Whether the acting user holds the admin flag.
    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}
