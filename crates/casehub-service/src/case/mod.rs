//! Case lifecycle: reconciliation, CRUD, and asset fan-out.

pub mod assets;
pub mod reconcile;
pub mod service;

use serde::{Deserialize, Serialize};

use casehub_auth::access::CasePermissions;

pub use assets::AssetLifecycle;
pub use reconcile::Reconciler;
pub use service::CaseService;

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename as uploaded.
    pub filename: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// Raw content.
    pub data: bytes::Bytes,
}

/// Input for case creation.
#[derive(Debug, Clone)]
pub struct NewCase {
    /// Slug-like case id (becomes the object-store folder name).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Description shown in listings.
    pub description: Option<String>,
    /// Plaintext case-lock password; hashed before anything is stored.
    pub password: Option<String>,
    /// Explanation markdown; a default is written when omitted.
    pub explanation_markdown: Option<String>,
    /// Case icon upload; a default avatar is synthesized when omitted.
    pub icon: Option<UploadedFile>,
    /// The case's assistants, in display order.
    pub assistants: Vec<NewAssistant>,
    /// Supporting documents.
    pub documents: Vec<UploadedFile>,
}

/// Input for one assistant at case creation (or later addition).
#[derive(Debug, Clone)]
pub struct NewAssistant {
    /// Assistant id, unique within the case.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: Option<String>,
    /// System-prompt markdown. Required — creation fails without it.
    pub prompt_markdown: Option<String>,
    /// Plaintext assistant-lock password; hashed before storage.
    pub password: Option<String>,
    /// Whether the assistant is usable from the start.
    pub is_available_at_start: bool,
    /// Position within the assistant list.
    pub order_index: i32,
    /// Label displayed while locked.
    pub locked_label: Option<String>,
    /// Icon upload; a default avatar is synthesized when omitted.
    pub icon: Option<UploadedFile>,
}

/// Input for a case configuration update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCase {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New plaintext password (`Some("")` clears the lock).
    pub password: Option<String>,
    /// The revision the caller read; mismatch fails with a conflict.
    pub expected_revision: u64,
}

/// One case in a listing, annotated for the acting user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    /// Case id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the case requires a password to open.
    pub has_password: bool,
    /// Freshly minted signed icon URL, when signing succeeded.
    pub icon_url: Option<String>,
    /// What the acting user may do with this case.
    pub permissions: CasePermissions,
}

/// Full case detail for the acting user. Password hashes never leave the
/// service layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetail {
    /// Case id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Author email.
    pub author: String,
    /// Whether the case requires a password to open.
    pub has_password: bool,
    /// Signed icon URL.
    pub icon_url: Option<String>,
    /// Signed explanation-markdown URL.
    pub explanation_url: Option<String>,
    /// Assistant views in display order.
    pub assistants: Vec<AssistantView>,
    /// Document views.
    pub documents: Vec<DocumentView>,
    /// When the case was created.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the configuration was last written.
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Optimistic-concurrency token for subsequent writes.
    pub revision: u64,
    /// What the acting user may do with this case.
    pub permissions: CasePermissions,
}

/// One assistant as presented to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantView {
    /// Assistant id.
    pub id: String,
    /// Owning case id.
    pub case_id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: Option<String>,
    /// Signed icon URL.
    pub icon_url: Option<String>,
    /// Whether chatting requires a password.
    pub has_password: bool,
    /// Whether the assistant is usable from the start.
    pub is_available_at_start: bool,
    /// Position within the case.
    pub order_index: i32,
    /// Label displayed while locked.
    pub locked_label: Option<String>,
}

/// One document as presented to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    /// Document id.
    pub id: String,
    /// Original filename.
    pub name: String,
    /// Signed download URL.
    pub url: Option<String>,
}
