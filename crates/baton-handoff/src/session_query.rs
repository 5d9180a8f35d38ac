//! The `session_query` tool.
//!
//! Loads any session file — typically an ancestor named in a handoff
//! prompt's parent block — and asks the model one question about its
//! transcript. Read-only: the active session is never touched.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use baton_core::messages::Message;
use baton_core::time::now_ms;
use baton_core::tools::{Tool, ToolOutput};
use baton_llm::{CompletionOptions, CompletionRequest, CompletionStopReason};
use baton_sessions::load_branch_messages;

use crate::constants::SESSION_QUERY_SYSTEM_PROMPT;
use crate::engine::HandoffEngine;
use crate::gather::serialize_transcript;
use crate::tool::HostTool;

/// The registered `session_query` tool.
pub struct SessionQueryTool {
    engine: Arc<HandoffEngine>,
}

impl SessionQueryTool {
    /// Create the tool over an engine.
    #[must_use]
    pub fn new(engine: Arc<HandoffEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl HostTool for SessionQueryTool {
    fn definition(&self) -> Tool {
        Tool::new(
            "session_query",
            "Load a session file and answer one question about its transcript. Use the \
             session paths listed under 'Parent session' or 'Ancestor sessions' in a \
             handoff prompt.",
            json!({
                "type": "object",
                "properties": {
                    "session": {
                        "type": "string",
                        "description": "Path to the session file to query"
                    },
                    "question": {
                        "type": "string",
                        "description": "The question to answer from the transcript"
                    }
                },
                "required": ["session", "question"]
            }),
        )
    }

    async fn execute(&self, arguments: Value) -> ToolOutput {
        let session = arguments
            .get("session")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        let question = arguments
            .get("question")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        self.engine.run_session_query(session, question).await
    }
}

impl HandoffEngine {
    pub(crate) async fn run_session_query(&self, session: &str, question: &str) -> ToolOutput {
        if session.is_empty() || question.is_empty() {
            return ToolOutput::error("Both a session path and a question are required.");
        }
        let Some(model) = self.model() else {
            return ToolOutput::error("No model is available for session queries.");
        };

        let messages = match load_branch_messages(Path::new(session)) {
            Ok(messages) => messages,
            Err(err) => {
                return ToolOutput::error(format!("Could not read session {session}: {err}"));
            }
        };
        if messages.is_empty() {
            return ToolOutput::error(format!("Session {session} has no messages."));
        }

        let body = format!(
            "## Transcript\n\n{}\n\n## Question\n\n{question}",
            serialize_transcript(&messages)
        );
        let request = CompletionRequest {
            system_prompt: Some(SESSION_QUERY_SYSTEM_PROMPT.to_string()),
            messages: vec![Message::user(body, now_ms())],
        };
        let options = CompletionOptions {
            api_key: self.models().get_api_key(&model),
            ..CompletionOptions::default()
        };

        match self.client().complete(&model, request, options).await {
            Ok(response) => match response.stop_reason {
                CompletionStopReason::Aborted => ToolOutput::error("Session query cancelled."),
                CompletionStopReason::Error => ToolOutput::error(
                    response
                        .error_message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "LLM request failed".to_string()),
                ),
                CompletionStopReason::EndTurn | CompletionStopReason::MaxTokens => {
                    let text = response.text_content().trim().to_string();
                    if text.is_empty() {
                        ToolOutput::error("LLM returned empty response")
                    } else {
                        ToolOutput::text(text)
                    }
                }
            },
            Err(err) => ToolOutput::error(err.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use baton_llm::{CompletionResponse, ModelRegistry};
    use baton_sessions::SessionManager;
    use std::sync::Arc;

    use crate::engine::HandoffDeps;
    use crate::settings::HandoffSettings;

    struct AnswerClient {
        answer: &'static str,
    }

    #[async_trait]
    impl baton_llm::CompletionClient for AnswerClient {
        async fn complete(
            &self,
            _model: &str,
            _request: CompletionRequest,
            _options: CompletionOptions,
        ) -> Result<CompletionResponse, baton_core::errors::ProviderError> {
            Ok(CompletionResponse::text(self.answer))
        }
    }

    fn tool(answer: &'static str) -> (tempfile::TempDir, Arc<SessionManager>, SessionQueryTool) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sessions = Arc::new(SessionManager::new(tmp.path()).expect("manager"));
        let engine = Arc::new(HandoffEngine::new(HandoffDeps {
            sessions: Arc::clone(&sessions),
            ui: None,
            client: Arc::new(AnswerClient { answer }),
            models: Arc::new(ModelRegistry::new()),
            settings: HandoffSettings {
                summary_model: Some("claude-sonnet-4-5".to_string()),
                ..HandoffSettings::default()
            },
        }));
        (tmp, sessions, SessionQueryTool::new(engine))
    }

    #[tokio::test]
    async fn answers_a_question_about_a_recorded_session() {
        let (_tmp, sessions, tool) = tool("The goal was OAuth.");
        let file = sessions.new_session(None, None).unwrap();
        sessions
            .append_message(Message::user("Let's implement OAuth", 1))
            .unwrap();

        let output = tool
            .execute(json!({
                "session": file.to_string_lossy(),
                "question": "What was the goal?"
            }))
            .await;
        assert!(output.is_error.is_none());
        assert_eq!(output.content, "The goal was OAuth.");
    }

    #[tokio::test]
    async fn missing_session_file_is_reported_as_text() {
        let (_tmp, _sessions, tool) = tool("unused");
        let output = tool
            .execute(json!({ "session": "/nowhere/gone.jsonl", "question": "anything" }))
            .await;
        assert_eq!(output.is_error, Some(true));
        assert!(output.content.contains("/nowhere/gone.jsonl"));
    }

    #[tokio::test]
    async fn missing_arguments_are_rejected() {
        let (_tmp, _sessions, tool) = tool("unused");
        let output = tool.execute(json!({ "session": "x.jsonl" })).await;
        assert_eq!(output.is_error, Some(true));
        assert!(output.content.contains("required"));
    }

    #[tokio::test]
    async fn empty_session_is_rejected() {
        let (_tmp, sessions, tool) = tool("unused");
        let file = sessions.new_session(None, None).unwrap();
        let output = tool
            .execute(json!({
                "session": file.to_string_lossy(),
                "question": "What happened?"
            }))
            .await;
        assert_eq!(output.is_error, Some(true));
        assert!(output.content.contains("no messages"));
    }
}
