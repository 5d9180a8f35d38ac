//! Summary generation.
//!
//! One model call under a cancellable loader, normalized into a flat
//! three-outcome result so every caller handles exactly: prompt, failure,
//! or user cancellation. The distinction matters for user messaging and for
//! whether the compaction hook falls back to compacting.

use tracing::{debug, trace};

use baton_core::messages::Message;
use baton_core::time::now_ms;
use baton_llm::{
    CompletionClient, CompletionOptions, CompletionRequest, CompletionStopReason, ModelRegistry,
};

use crate::constants::{LOADER_TITLE, SUMMARY_SYSTEM_PROMPT};
use crate::surface::Ui;

/// Outcome of one summary generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// A non-empty, trimmed summary.
    Prompt(String),
    /// LLM error, empty result, or transport failure.
    Failed(String),
    /// The user dismissed the loader.
    Cancelled,
}

/// Build the single user message body for the summary call.
#[must_use]
pub fn summary_request_body(conversation_text: &str, goal: &str) -> String {
    format!(
        "## Conversation History\n\n{conversation_text}\n\n## User's Goal for New Thread\n\n{goal}"
    )
}

/// Run one summary completion under the UI's cancellable loader.
pub async fn generate_summary(
    ui: &dyn Ui,
    client: &dyn CompletionClient,
    models: &ModelRegistry,
    model: &str,
    conversation_text: &str,
    goal: &str,
) -> SummaryOutcome {
    let body = summary_request_body(conversation_text, goal);
    let request = CompletionRequest {
        system_prompt: Some(SUMMARY_SYSTEM_PROMPT.to_string()),
        messages: vec![Message::user(body, now_ms())],
    };

    let loader = ui.begin_loader(LOADER_TITLE);
    let options = CompletionOptions {
        api_key: models.get_api_key(model),
        cancellation: loader.cancellation(),
    };

    trace!(model, chars = conversation_text.len(), "Generating handoff summary");
    let result = client.complete(model, request, options).await;
    ui.end_loader();

    match result {
        Ok(response) => match response.stop_reason {
            CompletionStopReason::Aborted => {
                debug!(model, "Summary generation cancelled by user");
                SummaryOutcome::Cancelled
            }
            CompletionStopReason::Error => {
                let message = response
                    .error_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "LLM request failed".to_string());
                SummaryOutcome::Failed(message)
            }
            CompletionStopReason::EndTurn | CompletionStopReason::MaxTokens => {
                let text = response.text_content().trim().to_string();
                if text.is_empty() {
                    SummaryOutcome::Failed("LLM returned empty response".to_string())
                } else {
                    SummaryOutcome::Prompt(text)
                }
            }
        },
        Err(err) => SummaryOutcome::Failed(err.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use baton_core::errors::{ProviderError, ProviderName};
    use baton_llm::CompletionResponse;
    use parking_lot::Mutex;
    use std::sync::Arc;

    use crate::surface::{Loader, Severity};

    // -- test doubles --

    #[derive(Default)]
    struct FakeUi {
        loader_open: Mutex<bool>,
        cancel_immediately: bool,
    }

    #[async_trait]
    impl Ui for FakeUi {
        fn set_editor_text(&self, _text: &str) {}
        fn notify(&self, _message: &str, _severity: Severity) {}
        async fn select(&self, _title: &str, _choices: &[String]) -> Option<usize> {
            None
        }
        fn begin_loader(&self, _title: &str) -> Loader {
            *self.loader_open.lock() = true;
            let loader = Loader::default();
            if self.cancel_immediately {
                loader.cancellation().cancel();
            }
            loader
        }
        fn end_loader(&self) {
            *self.loader_open.lock() = false;
        }
    }

    enum Script {
        Respond(CompletionResponse),
        Fail,
        EchoAbort,
    }

    struct ScriptedClient {
        script: Script,
        seen_request: Arc<Mutex<Option<CompletionRequest>>>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _model: &str,
            request: CompletionRequest,
            options: CompletionOptions,
        ) -> Result<CompletionResponse, ProviderError> {
            *self.seen_request.lock() = Some(request);
            match &self.script {
                Script::Respond(response) => Ok(response.clone()),
                Script::Fail => Err(ProviderError::new(
                    ProviderName::Anthropic,
                    "m",
                    "connection reset",
                )),
                Script::EchoAbort => {
                    if options.cancellation.is_cancelled() {
                        Ok(CompletionResponse::aborted())
                    } else {
                        Ok(CompletionResponse::text("not cancelled"))
                    }
                }
            }
        }
    }

    async fn run(ui: &FakeUi, script: Script) -> (SummaryOutcome, Option<CompletionRequest>) {
        let seen = Arc::new(Mutex::new(None));
        let client = ScriptedClient {
            script,
            seen_request: seen.clone(),
        };
        let models = ModelRegistry::new();
        let outcome = generate_summary(ui, &client, &models, "m", "user:\nhi", "ship it").await;
        let request = seen.lock().clone();
        (outcome, request)
    }

    // -- request shape --

    #[tokio::test]
    async fn request_has_fixed_system_prompt_and_two_part_body() {
        let ui = FakeUi::default();
        let (outcome, request) = run(&ui, Script::Respond(CompletionResponse::text("ok"))).await;
        assert_eq!(outcome, SummaryOutcome::Prompt("ok".into()));

        let request = request.unwrap();
        assert_eq!(request.system_prompt.as_deref(), Some(SUMMARY_SYSTEM_PROMPT));
        assert_eq!(request.messages.len(), 1);
        let body = match &request.messages[0] {
            Message::User { content, .. } => baton_core::messages::extract_user_text(content),
            _ => panic!("expected user message"),
        };
        assert!(body.starts_with("## Conversation History\n\nuser:\nhi"));
        assert!(body.ends_with("## User's Goal for New Thread\n\nship it"));
    }

    // -- outcome mapping --

    #[tokio::test]
    async fn aborted_stop_reason_maps_to_cancelled() {
        let ui = FakeUi {
            cancel_immediately: true,
            ..FakeUi::default()
        };
        let (outcome, _) = run(&ui, Script::EchoAbort).await;
        assert_eq!(outcome, SummaryOutcome::Cancelled);
    }

    #[tokio::test]
    async fn error_stop_reason_uses_provider_message() {
        let ui = FakeUi::default();
        let (outcome, _) = run(
            &ui,
            Script::Respond(CompletionResponse::error("context_length_exceeded")),
        )
        .await;
        assert_eq!(
            outcome,
            SummaryOutcome::Failed("context_length_exceeded".into())
        );
    }

    #[tokio::test]
    async fn error_without_message_uses_default() {
        let ui = FakeUi::default();
        let mut response = CompletionResponse::error("");
        response.error_message = None;
        let (outcome, _) = run(&ui, Script::Respond(response)).await;
        assert_eq!(outcome, SummaryOutcome::Failed("LLM request failed".into()));
    }

    #[tokio::test]
    async fn empty_text_is_a_failure() {
        let ui = FakeUi::default();
        let (outcome, _) = run(&ui, Script::Respond(CompletionResponse::text("  \n "))).await;
        assert_eq!(
            outcome,
            SummaryOutcome::Failed("LLM returned empty response".into())
        );
    }

    #[tokio::test]
    async fn transport_error_maps_to_failed() {
        let ui = FakeUi::default();
        let (outcome, _) = run(&ui, Script::Fail).await;
        match outcome {
            SummaryOutcome::Failed(message) => assert!(message.contains("connection reset")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn loader_is_closed_after_the_call() {
        let ui = FakeUi::default();
        let _ = run(&ui, Script::Respond(CompletionResponse::text("ok"))).await;
        assert!(!*ui.loader_open.lock());
    }

    #[tokio::test]
    async fn result_is_trimmed() {
        let ui = FakeUi::default();
        let (outcome, _) =
            run(&ui, Script::Respond(CompletionResponse::text("\n ## Goal\nship \n"))).await;
        assert_eq!(outcome, SummaryOutcome::Prompt("## Goal\nship".into()));
    }
}
