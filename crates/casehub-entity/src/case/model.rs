//! Case entity model (relational projection).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The relational projection of a case.
///
/// The object store is the source of truth for case *content*; this row
/// exists purely so access-control queries stay relational. Its id is the
/// case folder name in the object store — a natural key shared across both
/// stores. A row should exist if and only if the matching
/// `demos/{id}/config.json` object exists; reconciliation repairs drift in
/// either direction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Case {
    /// Slug-like case id, shared with the object store folder name.
    pub id: String,
    /// Display name, denormalized from the configuration document.
    pub name: String,
    /// Description, denormalized from the configuration document.
    pub description: Option<String>,
    /// The user who created the case.
    pub creator_id: Uuid,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}
