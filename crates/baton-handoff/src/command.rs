//! The `/handoff <goal>` user command.
//!
//! Runs while the agent loop is idle, with a privileged command context
//! whose new-session call fires the full host event fan-out. The editor is
//! installed by the `SessionSwitch` handler — not here — because the
//! privileged call only returns after the host has fired that event, and
//! the editor must be set after the new session is current.

use std::sync::Arc;

use tracing::info;

use crate::engine::HandoffEngine;
use crate::gather::gather_conversation;
use crate::prompt::slugify;
use crate::summary::{generate_summary, SummaryOutcome};
use crate::surface::{CommandContext, Severity};

/// The registered `handoff` command.
pub struct HandoffCommand {
    engine: Arc<HandoffEngine>,
}

impl HandoffCommand {
    /// Command name as typed by the user.
    pub const NAME: &'static str = "handoff";

    /// Create the command over an engine.
    #[must_use]
    pub fn new(engine: Arc<HandoffEngine>) -> Self {
        Self { engine }
    }

    /// Run the command with the user's goal text.
    pub async fn run(&self, goal: &str, ctx: &dyn CommandContext) {
        self.engine.run_handoff_command(goal, ctx).await;
    }
}

impl HandoffEngine {
    pub(crate) async fn run_handoff_command(&self, goal: &str, ctx: &dyn CommandContext) {
        let goal = goal.trim();
        if goal.is_empty() {
            self.notify("A goal is required: /handoff <goal>", Severity::Error);
            return;
        }
        let Some(model) = self.model() else {
            self.notify(
                "No model is available for summary generation",
                Severity::Error,
            );
            return;
        };
        let Some(ui) = self.ui().cloned() else {
            return;
        };
        let Some(gathered) = gather_conversation(self.sessions()) else {
            self.notify(
                "Nothing to hand off: the conversation is empty",
                Severity::Error,
            );
            return;
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
                self.notify("Handoff cancelled", Severity::Info);
                return;
            }
            SummaryOutcome::Failed(message) => {
                self.notify(
                    &format!("Handoff summary failed: {message}"),
                    Severity::Error,
                );
                return;
            }
        };

        let (prompt, file_ops, parent) = self.build_prompt(&summary, &gathered.messages);
        if let Some(parent) = &parent {
            self.register_pending_text(parent.clone(), prompt.clone());
        }
        self.stage_markers(file_ops.as_ref());

        let label = slugify(goal);
        let label = (!label.is_empty()).then_some(label);
        let created = ctx.new_session(parent.as_deref(), label.as_deref()).await;
        match created {
            Ok(Some(file)) => {
                // The SessionSwitch handler installed the editor text while
                // the privileged call was in flight.
                self.activate_markers();
                if parent.is_none() {
                    // No parent key to route the prompt through; install
                    // directly.
                    ui.set_editor_text(&prompt);
                    self.notify(crate::constants::HANDOFF_READY_NOTICE, Severity::Info);
                }
                info!(file = %file.display(), "Handoff session created");
            }
            Ok(None) => {
                if let Some(parent) = &parent {
                    self.purge_pending_text(parent);
                }
                self.discard_staged_markers();
                self.notify("New session cancelled", Severity::Info);
            }
            Err(err) => {
                if let Some(parent) = &parent {
                    self.purge_pending_text(parent);
                }
                self.discard_staged_markers();
                self.notify(
                    &format!("Creating the new session failed: {err}"),
                    Severity::Error,
                );
            }
        }
    }
}
