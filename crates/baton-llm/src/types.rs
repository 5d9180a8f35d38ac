//! Completion request/response types.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use baton_core::content::AssistantContent;
use baton_core::messages::Message;

/// Why a completion stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStopReason {
    /// Natural end of response.
    EndTurn,
    /// Hit the max output token limit.
    MaxTokens,
    /// The caller's cancellation token fired.
    Aborted,
    /// The provider reported a failure; see
    /// [`CompletionResponse::error_message`].
    Error,
}

/// One non-streaming completion request: a system prompt and messages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Conversation messages.
    pub messages: Vec<Message>,
}

/// Per-call options.
#[derive(Clone, Debug, Default)]
pub struct CompletionOptions {
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Cancellation token; firing it resolves the call with an
    /// [`Aborted`](CompletionStopReason::Aborted) stop reason.
    pub cancellation: CancellationToken,
}

/// Result of one completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Content blocks emitted by the model.
    pub content: Vec<AssistantContent>,
    /// Why the completion stopped.
    pub stop_reason: CompletionStopReason,
    /// Provider-reported error message when `stop_reason` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CompletionResponse {
    /// A response carrying text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![AssistantContent::text(text)],
            stop_reason: CompletionStopReason::EndTurn,
            error_message: None,
        }
    }

    /// An aborted response.
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            content: Vec::new(),
            stop_reason: CompletionStopReason::Aborted,
            error_message: None,
        }
    }

    /// A provider-reported failure.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: Vec::new(),
            stop_reason: CompletionStopReason::Error,
            error_message: Some(message.into()),
        }
    }

    /// All text blocks concatenated, in order.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(AssistantContent::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}
