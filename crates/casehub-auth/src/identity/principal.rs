//! The authenticated principal and its resolution rules.
//!
//! An external identity provider authenticates every request and forwards
//! the principal's email in a trusted header. CaseHub takes that email as
//! the identity key and performs no further verification.

use serde::{Deserialize, Serialize};

use casehub_core::config::identity::IdentityConfig;
use casehub_core::error::AppError;

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Email address, lowercased — the identity key.
    pub email: String,
    /// Display name, when the provider forwards one.
    pub display_name: Option<String>,
}

/// Resolves principals from forwarded identity headers.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    email_header: String,
    display_name_header: String,
    bootstrap_super_admin: Option<String>,
}

impl IdentityResolver {
    /// Create a resolver from identity configuration.
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            email_header: config.email_header.to_lowercase(),
            display_name_header: config.display_name_header.to_lowercase(),
            bootstrap_super_admin: if config.bootstrap_super_admin.is_empty() {
                None
            } else {
                Some(config.bootstrap_super_admin.to_lowercase())
            },
        }
    }

    /// Header name carrying the principal email.
    pub fn email_header(&self) -> &str {
        &self.email_header
    }

    /// Header name carrying the display name.
    pub fn display_name_header(&self) -> &str {
        &self.display_name_header
    }

    /// Build a [`Principal`] from raw header values.
    ///
    /// A missing or empty email is an unauthorized request: the identity
    /// provider in front of us should never let one through.
    pub fn resolve(
        &self,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Principal, AppError> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::unauthorized("No authenticated principal on request"))?;

        Ok(Principal {
            email: email.to_lowercase(),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
        })
    }

    /// Whether this email is the configured one-time super-admin bootstrap.
    ///
    /// The persisted `is_super_admin` flag is the only standing source of
    /// super-admin status; this check exists solely so the first sign-in
    /// of the configured operator sets that flag.
    pub fn is_bootstrap_super_admin(&self, email: &str) -> bool {
        self.bootstrap_super_admin.as_deref() == Some(&email.to_lowercase()[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IdentityResolver {
        IdentityResolver::new(&IdentityConfig {
            email_header: "x-auth-request-email".to_string(),
            display_name_header: "x-auth-request-preferred-username".to_string(),
            bootstrap_super_admin: "Root@Example.edu".to_string(),
        })
    }

    #[test]
    fn resolves_and_normalizes_email() {
        let principal = resolver()
            .resolve(Some("Prof.X@Example.EDU"), Some("Prof X"))
            .unwrap();
        assert_eq!(principal.email, "prof.x@example.edu");
        assert_eq!(principal.display_name.as_deref(), Some("Prof X"));
    }

    #[test]
    fn missing_email_is_unauthorized() {
        assert!(resolver().resolve(None, None).is_err());
        assert!(resolver().resolve(Some("   "), None).is_err());
    }

    #[test]
    fn bootstrap_check_is_case_insensitive() {
        let r = resolver();
        assert!(r.is_bootstrap_super_admin("root@example.edu"));
        assert!(!r.is_bootstrap_super_admin("other@example.edu"));
    }
}
