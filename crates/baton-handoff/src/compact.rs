//! The compaction-hook entry point.
//!
//! Fires when the host is about to summarize-in-place because context is
//! over budget. The agent loop is not running, so the adapter acts
//! synchronously, but it holds only a read-only session handle: the switch
//! uses the store's raw new-session call. Every failure path returns
//! `None`, which lets compaction proceed.

use baton_hooks::types::CompactPreparation;
use baton_hooks::EventModifier;
use tracing::{info, warn};

use crate::constants::{DEFAULT_COMPACT_GOAL, HANDOFF_READY_NOTICE};
use crate::engine::HandoffEngine;
use crate::gather::serialize_transcript;
use crate::summary::{generate_summary, SummaryOutcome};
use crate::surface::Severity;

const CHOICE_HANDOFF: &str = "Handoff to new session";
const CHOICE_COMPACT: &str = "Compact context";
const CHOICE_CONTINUE: &str = "Continue without either";

impl HandoffEngine {
    /// `SessionBeforeCompact`: offer a handoff instead of compaction.
    pub(crate) async fn on_session_before_compact(
        &self,
        usage_percent: Option<u8>,
        preparation: &CompactPreparation,
    ) -> Option<EventModifier> {
        // Without a UI or a model there is nothing to offer; let
        // compaction proceed.
        let ui = self.ui().cloned()?;
        let model = self.model()?;

        let usage = usage_percent.map_or_else(|| "high".to_string(), |p| format!("{p}% full"));
        let title = format!("Context usage is {usage}. Hand off to a new session?");
        let choices = vec![
            CHOICE_HANDOFF.to_string(),
            CHOICE_COMPACT.to_string(),
            CHOICE_CONTINUE.to_string(),
        ];

        match ui.select(&title, &choices).await {
            Some(0) => {}
            Some(2) => return Some(EventModifier::Cancel),
            // "Compact context", dismissal, or an out-of-range index: let
            // compaction proceed untouched.
            _ => return None,
        }

        // Build the summary input from what the host already prepared.
        // Re-gathering the full branch would re-introduce the overflow
        // that triggered this hook.
        let mut parts = Vec::new();
        if let Some(previous) = &preparation.previous_summary {
            parts.push(previous.clone());
        }
        parts.push(format!(
            "## Recent Conversation\n\n{}",
            serialize_transcript(&preparation.messages_to_summarize)
        ));
        let conversation_text = parts.join("\n\n");

        let outcome = generate_summary(
            ui.as_ref(),
            self.client(),
            self.models(),
            &model,
            &conversation_text,
            DEFAULT_COMPACT_GOAL,
        )
        .await;
        let summary = match outcome {
            SummaryOutcome::Prompt(text) => text,
            SummaryOutcome::Cancelled => {
                self.notify("Handoff cancelled. Compacting instead.", Severity::Warning);
                return None;
            }
            SummaryOutcome::Failed(message) => {
                self.notify(
                    &format!("Handoff summary failed: {message}. Compacting instead."),
                    Severity::Warning,
                );
                return None;
            }
        };

        let (prompt, file_ops, parent) =
            self.build_prompt(&summary, &preparation.messages_to_summarize);

        let _ = self.set_handoff_timestamp_now();
        if let Err(err) = self.sessions().new_session(parent.as_deref(), None) {
            self.clear_handoff_timestamp();
            warn!(error = %err, "Raw session switch failed in compact hook");
            self.notify(
                &format!("Switching sessions failed: {err}. Compacting instead."),
                Severity::Warning,
            );
            return None;
        }

        self.stage_markers(file_ops.as_ref());
        self.activate_markers();
        ui.set_editor_text(&prompt);
        self.notify(HANDOFF_READY_NOTICE, Severity::Info);
        info!(parent = ?parent, "Handoff replaced in-place compaction");
        Some(EventModifier::Cancel)
    }
}
