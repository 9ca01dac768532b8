//! Access grant role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role conferred by an access grant.
///
/// Both roles grant view access to a case; neither grants edit or delete.
/// PROFESSOR is the role auto-granted to a case's creator on first
/// reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grant_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantRole {
    /// A student taking the case.
    Student,
    /// A professor running the case.
    Professor,
}

impl GrantRole {
    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Professor => "PROFESSOR",
        }
    }
}

impl fmt::Display for GrantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
