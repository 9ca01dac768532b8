//! Identity-provider integration configuration.
//!
//! Authentication is delegated to an external identity provider sitting in
//! front of this service. CaseHub trusts the email it forwards on every
//! request and performs no further verification.

use serde::{Deserialize, Serialize};

/// Identity integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Header carrying the authenticated principal's email address.
    #[serde(default = "default_email_header")]
    pub email_header: String,
    /// Header carrying the principal's display name, if forwarded.
    #[serde(default = "default_name_header")]
    pub display_name_header: String,
    /// Email granted the super-admin flag on first sight, as a one-time
    /// bootstrap. The persisted `is_super_admin` flag is the only standing
    /// source of super-admin status.
    #[serde(default)]
    pub bootstrap_super_admin: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            email_header: default_email_header(),
            display_name_header: default_name_header(),
            bootstrap_super_admin: String::new(),
        }
    }
}

fn default_email_header() -> String {
    "x-auth-request-email".to_string()
}

fn default_name_header() -> String {
    "x-auth-request-preferred-username".to_string()
}
