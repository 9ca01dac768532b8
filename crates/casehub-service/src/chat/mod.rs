//! Chat-completion proxying.

pub mod service;

use serde::{Deserialize, Serialize};

pub use service::ChatService;

/// One turn of prior conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant".
    pub role: String,
    /// The turn's text.
    pub content: String,
}

/// A chat request as received from the client and forwarded upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The new user prompt.
    pub prompt: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// The assistant being addressed.
    pub assistant_id: String,
    /// The case the assistant belongs to.
    pub case_id: String,
}
