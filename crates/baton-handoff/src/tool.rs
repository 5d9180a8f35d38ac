//! The agent-invocable `handoff` tool.
//!
//! Runs while the agent loop is active, with only a read-only session
//! handle. Switching sessions mid-loop would strand the in-flight tool
//! result, so the tool arms the one-slot pending register and the
//! `AgentEnd` drain performs the switch after the turn completes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use baton_core::tools::{Tool, ToolOutput};

use crate::constants::HANDOFF_INITIATED_NOTICE;
use crate::engine::{HandoffEngine, PendingHandoff};
use crate::gather::gather_conversation;
use crate::prompt::slugify;
use crate::summary::{generate_summary, SummaryOutcome};

/// An agent-invocable tool registered with the host.
#[async_trait]
pub trait HostTool: Send + Sync {
    /// Schema sent to the model.
    fn definition(&self) -> Tool;

    /// Execute with JSON arguments. Failures are reported as text content
    /// so the agent can see and react to them.
    async fn execute(&self, arguments: Value) -> ToolOutput;
}

/// The registered `handoff` tool.
pub struct HandoffTool {
    engine: Arc<HandoffEngine>,
}

impl HandoffTool {
    /// Create the tool over an engine.
    #[must_use]
    pub fn new(engine: Arc<HandoffEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl HostTool for HandoffTool {
    fn definition(&self) -> Tool {
        Tool::new(
            "handoff",
            "Transfer this conversation into a new session that starts from a compact, \
             goal-directed summary instead of the full history. The switch happens after \
             the current turn completes.",
            json!({
                "type": "object",
                "properties": {
                    "goal": {
                        "type": "string",
                        "description": "What the new session should accomplish"
                    }
                },
                "required": ["goal"]
            }),
        )
    }

    async fn execute(&self, arguments: Value) -> ToolOutput {
        let goal = arguments
            .get("goal")
            .and_then(Value::as_str)
            .unwrap_or_default();
        self.engine.run_handoff_tool(goal).await
    }
}

impl HandoffEngine {
    pub(crate) async fn run_handoff_tool(&self, goal: &str) -> ToolOutput {
        let goal = goal.trim();
        if goal.is_empty() {
            return ToolOutput::error("A goal is required.");
        }
        let Some(ui) = self.ui().cloned() else {
            return ToolOutput::error("No interactive UI is available for handoff.");
        };
        let Some(model) = self.model() else {
            return ToolOutput::error("No model is available for summary generation.");
        };
        let Some(gathered) = gather_conversation(self.sessions()) else {
            return ToolOutput::error("Nothing to hand off: the conversation is empty.");
        };

        let outcome = generate_summary(
            ui.as_ref(),
            self.client(),
            self.models(),
            &model,
            &gathered.text,
            goal,
        )
        .await;
        let summary = match outcome {
            SummaryOutcome::Prompt(text) => text,
            SummaryOutcome::Cancelled => {
                return ToolOutput::error("Handoff cancelled by user.");
            }
            SummaryOutcome::Failed(message) => {
                return ToolOutput::error(format!("Handoff summary failed: {message}"));
            }
        };

        let (prompt, file_ops, parent) = self.build_prompt(&summary, &gathered.messages);
        self.stage_markers(file_ops.as_ref());

        let label = slugify(goal);
        self.arm_pending_handoff(PendingHandoff {
            prompt,
            parent_session: parent,
            label: (!label.is_empty()).then_some(label),
        });
        ToolOutput::text(HANDOFF_INITIATED_NOTICE)
    }
}
