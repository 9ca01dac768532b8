//! Request DTOs.
//!
//! Multipart case creation carries a `config` JSON part matching
//! [`CreateCaseRequest`]; file parts are matched to it by field name.

use serde::{Deserialize, Serialize};
use validator::Validate;

use casehub_entity::grant::GrantRole;

/// `POST /api/cases` — the `config` multipart part.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    /// Slug-like case id.
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    /// Display title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Description shown in listings.
    pub description: Option<String>,
    /// Plaintext case-lock password.
    pub password: Option<String>,
    /// Explanation markdown; defaulted when absent.
    pub explanation_markdown: Option<String>,
    /// Assistants, in display order.
    #[validate(nested)]
    #[serde(default)]
    pub assistants: Vec<CreateAssistantRequest>,
}

/// One assistant inside [`CreateCaseRequest`], or the body of
/// `POST /api/cases/{id}/assistants`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    /// Assistant id, unique within the case.
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Short description.
    pub description: Option<String>,
    /// System-prompt markdown. Required for creation.
    pub prompt_markdown: Option<String>,
    /// Plaintext assistant-lock password.
    pub password: Option<String>,
    /// Whether usable from the start. Defaults to true.
    #[serde(default = "default_true")]
    pub is_available_at_start: bool,
    /// Position within the assistant list.
    #[serde(default)]
    pub order_index: i32,
    /// Label displayed while locked.
    pub locked_label: Option<String>,
}

/// `POST /api/cases/{id}/assistants` — the JSON body plus the expected
/// revision for the config rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddAssistantRequest {
    /// The assistant to add.
    #[validate(nested)]
    #[serde(flatten)]
    pub assistant: CreateAssistantRequest,
    /// The revision the caller read.
    pub expected_revision: u64,
}

/// `PUT /api/cases/{id}/assistants/{aid}/markdown`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarkdownRequest {
    /// The new prompt markdown.
    #[validate(length(min = 1))]
    pub content: String,
}

/// `POST /api/cases/{id}/assistants/{aid}/unlock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequest {
    /// The attempted assistant password.
    pub password: String,
}

/// `POST /api/admin/cases/{id}/grants`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    /// Email of the user being granted (row created when unknown).
    #[validate(email)]
    pub email: String,
    /// The role to grant.
    pub role: GrantRole,
}

/// `POST /api/admin/cases/{id}/admins`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrantAdminRequest {
    /// Email of the admin-flagged user being granted.
    #[validate(email)]
    pub email: String,
}

/// `PUT /api/admin/users/{id}/flags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlagsRequest {
    /// New admin flag, if changing.
    pub is_admin: Option<bool>,
    /// New super-admin flag, if changing.
    pub is_super_admin: Option<bool>,
    /// New case-creation flag, if changing.
    pub can_create_cases: Option<bool>,
}

/// Case-password query for `GET /api/cases/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CasePasswordQuery {
    /// The attempted case password.
    pub password: Option<String>,
}

/// Signed-URL token query for `GET /objects/{*path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedObjectQuery {
    /// Unix expiry the signature covers.
    pub expires: u64,
    /// The signature itself.
    pub sig: String,
}

fn default_true() -> bool {
    true
}
