//! Conversation gathering and transcript serialization.
//!
//! The gather step uses the store's compaction-aware projection so the
//! summary input never exceeds the branch view the host itself would have
//! presented to the model on the next turn.

use baton_core::content::AssistantContent;
use baton_core::messages::{extract_user_text, Message};
use baton_sessions::SessionManager;

/// The gathered conversation: serialized text plus the messages it came
/// from (callers reuse the messages for file-op extraction).
#[derive(Clone, Debug)]
pub struct GatheredConversation {
    /// Role-prefixed transcript text.
    pub text: String,
    /// The projected messages.
    pub messages: Vec<Message>,
}

/// Gather the current branch for summarization.
///
/// Returns `None` when the projection holds no messages — there is nothing
/// to hand off.
#[must_use]
pub fn gather_conversation(sessions: &SessionManager) -> Option<GatheredConversation> {
    let (previous_summary, messages) = sessions.context_messages();
    if messages.is_empty() {
        return None;
    }

    let mut text = String::new();
    if let Some(summary) = previous_summary {
        text.push_str("[Summary of earlier conversation]\n");
        text.push_str(&summary);
        text.push_str("\n\n");
    }
    text.push_str(&serialize_transcript(&messages));
    Some(GatheredConversation { text, messages })
}

/// Serialize messages into the stable role-prefixed transcript format
/// shared with the session-query tool.
#[must_use]
pub fn serialize_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_message(message: &Message) -> String {
    match message {
        Message::User { content, .. } => format!("user:\n{}", extract_user_text(content)),
        Message::System { content, .. } => format!("system:\n{content}"),
        Message::Assistant { content, .. } => {
            let mut parts = Vec::new();
            for block in content {
                match block {
                    AssistantContent::Text { text } => parts.push(text.clone()),
                    AssistantContent::ToolUse { name, .. } => {
                        parts.push(format!("[tool: {name}]"));
                    }
                    AssistantContent::Thinking { .. } => {}
                }
            }
            format!("assistant:\n{}", parts.join("\n"))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
