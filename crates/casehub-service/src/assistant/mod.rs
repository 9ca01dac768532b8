//! Assistant operations within a case configuration.

pub mod service;

use serde::Deserialize;

pub use service::AssistantService;

/// Input for an assistant metadata update. Markdown content is updated
/// through a separate targeted operation, never through this.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssistant {
    /// New display name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New plaintext password (`Some("")` clears the lock).
    pub password: Option<String>,
    /// New start-availability, if changing.
    pub is_available_at_start: Option<bool>,
    /// New position, if changing.
    pub order_index: Option<i32>,
    /// New locked label, if changing.
    pub locked_label: Option<String>,
    /// The revision the caller read; mismatch fails with a conflict.
    pub expected_revision: u64,
}
