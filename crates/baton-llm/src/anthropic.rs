//! Anthropic Messages API provider.
//!
//! Non-streaming only: the handoff subsystem needs exactly one summary (or
//! one answer) per call. Authentication is API key (`x-api-key` header).

use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use async_trait::async_trait;

use baton_core::content::AssistantContent;
use baton_core::errors::{ProviderError, ProviderName};
use baton_core::messages::{extract_user_text, Message};

use crate::client::CompletionClient;
use crate::types::{
    CompletionOptions, CompletionRequest, CompletionResponse, CompletionStopReason,
};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

/// Map an Anthropic stop reason to a unified stop reason.
///
/// The Messages API uses:
/// - `"end_turn"` -> natural completion
/// - `"max_tokens"` -> output limit reached
/// - `"stop_sequence"` / `"tool_use"` -> treated as a normal end here
/// - `null` -> default to `end_turn`
#[must_use]
pub fn map_anthropic_stop_reason(reason: Option<&str>) -> CompletionStopReason {
    match reason {
        Some("max_tokens") => CompletionStopReason::MaxTokens,
        _ => CompletionStopReason::EndTurn,
    }
}

/// Anthropic Messages API client.
pub struct AnthropicClient {
    http: reqwest::Client,
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnthropicClient {
    /// Create a client with a fresh HTTP connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn build_body(model: &str, request: &CompletionRequest) -> Value {
        let mut system = request.system_prompt.clone().unwrap_or_default();
        let mut messages = Vec::new();

        for message in &request.messages {
            match message {
                Message::User { content, .. } => {
                    messages.push(json!({
                        "role": "user",
                        "content": extract_user_text(content),
                    }));
                }
                Message::Assistant { content, .. } => {
                    let text = baton_core::messages::extract_assistant_text(content);
                    messages.push(json!({ "role": "assistant", "content": text }));
                }
                Message::System { content, .. } => {
                    // The Messages API has no system role; fold into the
                    // system prompt.
                    if !system.is_empty() {
                        system.push_str("\n\n");
                    }
                    system.push_str(content);
                }
            }
        }

        let mut body = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": messages,
        });
        if !system.is_empty() {
            body["system"] = Value::String(system);
        }
        body
    }
}

#[derive(Deserialize)]
struct ApiContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ApiContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_key = options.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            return Ok(CompletionResponse::error("missing API key for anthropic"));
        }

        let body = Self::build_body(model, &request);
        trace!(model, messages = request.messages.len(), "Anthropic completion request");

        let send = self
            .http
            .post(API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send();

        let response = race_cancellation(&options.cancellation, send).await;
        let response = match response {
            RaceOutcome::Cancelled => return Ok(CompletionResponse::aborted()),
            RaceOutcome::Done(Err(err)) => {
                return Err(ProviderError::new(
                    ProviderName::Anthropic,
                    model,
                    "request failed",
                )
                .network()
                .with_source(err));
            }
            RaceOutcome::Done(Ok(response)) => response,
        };

        let status = response.status();
        let raw = race_cancellation(&options.cancellation, response.text()).await;
        let raw = match raw {
            RaceOutcome::Cancelled => return Ok(CompletionResponse::aborted()),
            RaceOutcome::Done(Err(err)) => {
                return Err(ProviderError::new(
                    ProviderName::Anthropic,
                    model,
                    "response body unreadable",
                )
                .network()
                .with_source(err));
            }
            RaceOutcome::Done(Ok(raw)) => raw,
        };

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .ok()
                .and_then(|body| body.error)
                .map_or_else(|| format!("HTTP {status}"), |detail| detail.message);
            debug!(model, %status, "Anthropic completion failed");
            return Ok(CompletionResponse::error(message));
        }

        let parsed: ApiResponse = serde_json::from_str(&raw).map_err(|err| {
            ProviderError::new(ProviderName::Anthropic, model, "response parse failed")
                .with_source(err)
        })?;

        let content = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| AssistantContent::text(block.text))
            .collect();

        Ok(CompletionResponse {
            content,
            stop_reason: map_anthropic_stop_reason(parsed.stop_reason.as_deref()),
            error_message: None,
        })
    }
}

enum RaceOutcome<T> {
    Done(T),
    Cancelled,
}

async fn race_cancellation<T>(
    token: &CancellationToken,
    fut: impl std::future::Future<Output = T>,
) -> RaceOutcome<T> {
    tokio::select! {
        biased;
        () = token.cancelled() => RaceOutcome::Cancelled,
        value = fut => RaceOutcome::Done(value),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
