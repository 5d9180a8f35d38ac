//! Message types for the conversation model.
//!
//! Messages form the conversation history passed to LLM providers and stored
//! in session files. Timestamps are epoch milliseconds, monotonic within a
//! session, and are the sole ordering key used by the handoff context filter.

use serde::{Deserialize, Serialize};

use crate::content::{AssistantContent, UserContent};

/// Content of a user message — either a plain string or structured blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserMessageContent {
    /// Simple text.
    Text(String),
    /// Structured content blocks.
    Blocks(Vec<UserContent>),
}

/// A conversation message (discriminated by `role`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Message {
    /// User message.
    #[serde(rename = "user")]
    User {
        /// Message content.
        content: UserMessageContent,
        /// Epoch-millisecond timestamp.
        timestamp: i64,
    },
    /// Assistant message.
    #[serde(rename = "assistant")]
    Assistant {
        /// Content blocks.
        content: Vec<AssistantContent>,
        /// Epoch-millisecond timestamp.
        timestamp: i64,
    },
    /// System message.
    #[serde(rename = "system")]
    System {
        /// Message content.
        content: String,
        /// Epoch-millisecond timestamp.
        timestamp: i64,
    },
}

impl Message {
    /// Create a user message from a plain string.
    #[must_use]
    pub fn user(text: impl Into<String>, timestamp: i64) -> Self {
        Self::User {
            content: UserMessageContent::Text(text.into()),
            timestamp,
        }
    }

    /// Create an assistant message from text.
    #[must_use]
    pub fn assistant(text: impl Into<String>, timestamp: i64) -> Self {
        Self::Assistant {
            content: vec![AssistantContent::text(text)],
            timestamp,
        }
    }

    /// Create an assistant message from content blocks.
    #[must_use]
    pub fn assistant_blocks(content: Vec<AssistantContent>, timestamp: i64) -> Self {
        Self::Assistant { content, timestamp }
    }

    /// Returns `true` if this is a user message.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Returns `true` if this is an assistant message.
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    /// The message timestamp (epoch ms).
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::User { timestamp, .. }
            | Self::Assistant { timestamp, .. }
            | Self::System { timestamp, .. } => *timestamp,
        }
    }

    /// Role name as it appears on the wire.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::System { .. } => "system",
        }
    }
}

/// Extract tool use blocks from assistant content.
pub fn extract_tool_calls(content: &[AssistantContent]) -> Vec<&AssistantContent> {
    content.iter().filter(|c| c.is_tool_use()).collect()
}

/// Extract text from assistant content blocks, joined by newlines.
#[must_use]
pub fn extract_assistant_text(content: &[AssistantContent]) -> String {
    content
        .iter()
        .filter_map(AssistantContent::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the plain text of a user message.
#[must_use]
pub fn extract_user_text(content: &UserMessageContent) -> String {
    match content {
        UserMessageContent::Text(text) => text.clone(),
        UserMessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|b| match b {
                UserContent::Text { text } => Some(text.as_str()),
                UserContent::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
