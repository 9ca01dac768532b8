//! Chat-completion service configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external chat-completion streaming service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Endpoint that accepts completion requests and responds with an SSE stream.
    #[serde(default = "default_completion_url")]
    pub completion_url: String,
    /// Read-inactivity timeout in seconds; an idle upstream stream is cut
    /// after this long without a chunk.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            completion_url: default_completion_url(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_completion_url() -> String {
    "http://localhost:9000/v1/chat/stream".to_string()
}

fn default_timeout() -> u64 {
    30
}
