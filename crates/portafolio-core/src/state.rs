//! UI-agnostic chat state types
//!
//! These are shared between the HTTP proxy and the chat clients, and double as
//! the wire format of the chat endpoint.

use serde::{Deserialize, Serialize};

/// A chat message in the visitor's conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender.
///
/// Only visitor-facing roles exist here; the system persona is added by the
/// proxy and can never be supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Body of a `POST /api/chat` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Locale code; unknown or missing codes fall back to the default locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}
