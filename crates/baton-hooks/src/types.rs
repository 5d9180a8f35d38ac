//! Core types for the event bus.
//!
//! Defines event kinds, per-event context payloads, and the typed modifiers
//! handlers can return. Contexts use `camelCase` serde renaming for wire
//! compatibility with the host's UI clients.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use baton_core::content::UserContent;
use baton_core::messages::Message;

/// Lifecycle event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// System prompt assembly, before the agent loop starts a turn.
    BeforeAgentStart,
    /// The current session changed through the host (full fan-out).
    SessionSwitch,
    /// Immediately before each model call, carrying the messages the host
    /// will submit.
    Context,
    /// The user submitted editor text (or another input source was ingested).
    Input,
    /// The agent loop finished its current turn.
    AgentEnd,
    /// The host is about to summarize-in-place because context is over
    /// budget. Handlers may cancel compaction.
    SessionBeforeCompact,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeAgentStart => write!(f, "BeforeAgentStart"),
            Self::SessionSwitch => write!(f, "SessionSwitch"),
            Self::Context => write!(f, "Context"),
            Self::Input => write!(f, "Input"),
            Self::AgentEnd => write!(f, "AgentEnd"),
            Self::SessionBeforeCompact => write!(f, "SessionBeforeCompact"),
        }
    }
}

/// Why a session switch happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchReason {
    /// A brand-new session was created.
    New,
    /// An existing session was resumed.
    Resume,
}

/// Where submitted input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// The interactive editor.
    Editor,
    /// A non-interactive source (stdin, RPC, extension).
    External,
}

/// What the host prepared for an in-place compaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactPreparation {
    /// Summary produced by a previous compaction, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_summary: Option<String>,
    /// The messages the host is about to summarize away.
    pub messages_to_summarize: Vec<Message>,
}

/// Event context — one variant per [`EventKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EventContext {
    /// Context for [`EventKind::BeforeAgentStart`].
    #[serde(rename_all = "camelCase")]
    BeforeAgentStart {
        /// The system prompt the host assembled so far.
        system_prompt: String,
    },
    /// Context for [`EventKind::SessionSwitch`].
    #[serde(rename_all = "camelCase")]
    SessionSwitch {
        /// Why the switch happened.
        reason: SwitchReason,
        /// File of the now-current session.
        session_file: Option<PathBuf>,
    },
    /// Context for [`EventKind::Context`].
    #[serde(rename_all = "camelCase")]
    Context {
        /// Messages the host will submit to the model.
        messages: Vec<Message>,
    },
    /// Context for [`EventKind::Input`].
    #[serde(rename_all = "camelCase")]
    Input {
        /// Submitted text.
        text: String,
        /// Attached images.
        images: Vec<UserContent>,
        /// Input source.
        source: InputSource,
    },
    /// Context for [`EventKind::AgentEnd`].
    AgentEnd,
    /// Context for [`EventKind::SessionBeforeCompact`].
    #[serde(rename_all = "camelCase")]
    SessionBeforeCompact {
        /// Context window usage, when the host knows it.
        usage_percent: Option<u8>,
        /// What the host prepared for compaction.
        preparation: CompactPreparation,
    },
}

impl EventContext {
    /// Get the [`EventKind`] for this context.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BeforeAgentStart { .. } => EventKind::BeforeAgentStart,
            Self::SessionSwitch { .. } => EventKind::SessionSwitch,
            Self::Context { .. } => EventKind::Context,
            Self::Input { .. } => EventKind::Input,
            Self::AgentEnd => EventKind::AgentEnd,
            Self::SessionBeforeCompact { .. } => EventKind::SessionBeforeCompact,
        }
    }
}

/// Typed modifier a handler can return.
///
/// Each variant applies to exactly one event kind; the dispatcher folds the
/// modifier into the event's running state and ignores (with a warning)
/// modifiers that do not match the event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventModifier {
    /// Replace the system prompt (`BeforeAgentStart`).
    SystemPrompt(String),
    /// Replace the messages the host will submit (`Context`).
    Messages(Vec<Message>),
    /// Replace the submitted input (`Input`).
    TransformInput {
        /// Rewritten text.
        text: String,
        /// Images to carry through.
        images: Vec<UserContent>,
    },
    /// Cancel the operation the event announces (`SessionBeforeCompact`).
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_kind_matches_variant() {
        let ctx = EventContext::BeforeAgentStart {
            system_prompt: "s".into(),
        };
        assert_eq!(ctx.kind(), EventKind::BeforeAgentStart);
        assert_eq!(EventContext::AgentEnd.kind(), EventKind::AgentEnd);
    }

    #[test]
    fn context_serde_tag() {
        let ctx = EventContext::SessionSwitch {
            reason: SwitchReason::New,
            session_file: Some(PathBuf::from("/s/a.jsonl")),
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["event"], "sessionSwitch");
        assert_eq!(json["reason"], "new");
        assert_eq!(json["sessionFile"], "/s/a.jsonl");
    }

    #[test]
    fn compact_context_roundtrip() {
        let ctx = EventContext::SessionBeforeCompact {
            usage_percent: Some(92),
            preparation: CompactPreparation {
                previous_summary: None,
                messages_to_summarize: vec![Message::user("hi", 1)],
            },
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let back: EventContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(EventKind::Context.to_string(), "Context");
        assert_eq!(
            EventKind::SessionBeforeCompact.to_string(),
            "SessionBeforeCompact"
        );
    }
}
