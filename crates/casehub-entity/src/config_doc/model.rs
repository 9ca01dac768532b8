//! Case configuration document model.
//!
//! Stored as JSON at `demos/{caseId}/config.json`. This document — not the
//! relational [`Case`](crate::case::Case) row — is the source of truth for
//! display content. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The full denormalized state of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseConfig {
    /// Slug-like case id, identical to the object-store folder name.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Description shown in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author email — the identity the case is reconciled under.
    pub author: String,
    /// Object key of the case icon, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// Whether opening the case requires a password.
    #[serde(default)]
    pub has_password: bool,
    /// Argon2 hash of the case password, when `has_password` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Object key of the case explanation markdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_markdown_path: Option<String>,
    /// The chat assistants belonging to this case.
    #[serde(default)]
    pub assistants: Vec<Assistant>,
    /// Supporting documents.
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    /// When the case was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token. Writers must echo the revision they
    /// read; a mismatch fails the write with a conflict. Absent in legacy
    /// documents, which deserialize as revision 0.
    #[serde(default)]
    pub revision: u64,
}

impl CaseConfig {
    /// Find an assistant by id.
    pub fn assistant(&self, assistant_id: &str) -> Option<&Assistant> {
        self.assistants.iter().find(|a| a.id == assistant_id)
    }

    /// Find an assistant by id, mutably.
    pub fn assistant_mut(&mut self, assistant_id: &str) -> Option<&mut Assistant> {
        self.assistants.iter_mut().find(|a| a.id == assistant_id)
    }

    /// Find a document by id.
    pub fn document(&self, document_id: &str) -> Option<&DocumentRef> {
        self.documents.iter().find(|d| d.id == document_id)
    }

    /// Stamp a mutation: bump `updated_at` and the revision token.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.revision += 1;
    }
}

/// One configured chat persona within a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
    /// Assistant id, unique within the case.
    pub id: String,
    /// The owning case id, carried explicitly. Legacy documents lacking
    /// the field deserialize with an empty string and are repaired on the
    /// next config write.
    #[serde(default)]
    pub case_id: String,
    /// Display name.
    pub name: String,
    /// Short description shown in the case overview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object key of the assistant icon, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// Whether chatting with this assistant requires a password.
    #[serde(default)]
    pub has_password: bool,
    /// Argon2 hash of the assistant password, when `has_password` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Whether the assistant is usable before any other is completed.
    #[serde(default = "default_true")]
    pub is_available_at_start: bool,
    /// Position within the case's assistant list.
    #[serde(default)]
    pub order_index: i32,
    /// Object key of the system-prompt markdown.
    pub markdown_path: String,
    /// Label displayed while the assistant is locked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_label: Option<String>,
}

/// A supporting document attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// Document id, unique within the case.
    pub id: String,
    /// Original filename, used for display.
    pub name: String,
    /// Object key under `demos/{caseId}/documents/`.
    pub path: String,
}

fn default_true() -> bool {
    true
}
