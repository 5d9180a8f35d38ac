//! Session file line types: header and typed entries.
//!
//! The header is always the first line of a session file. Entries carry
//! `id`/`parentId` so the file can hold a tree of entries; the store
//! linearizes the path to the current leaf.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use baton_core::messages::Message;

/// Value of the header's `type` field.
pub const HEADER_TYPE: &str = "session";

/// First line of every session file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    /// Discriminator, always `"session"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// File of the parent session, when this session was handed off from one.
    #[serde(rename = "parentSession", skip_serializing_if = "Option::is_none")]
    pub parent_session: Option<PathBuf>,
    /// Optional human-readable label (e.g. a slugged goal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SessionHeader {
    /// Create a header.
    #[must_use]
    pub fn new(parent_session: Option<PathBuf>, label: Option<String>) -> Self {
        Self {
            kind: HEADER_TYPE.to_string(),
            parent_session,
            label,
        }
    }

    /// Whether the `type` discriminator is valid.
    #[must_use]
    pub fn is_session(&self) -> bool {
        self.kind == HEADER_TYPE
    }
}

/// A typed entry line in a session file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEntry {
    /// A conversation message.
    #[serde(rename = "message")]
    Message {
        /// Entry ID.
        id: String,
        /// Parent entry ID (`None` for the first entry).
        #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
        /// The message.
        message: Message,
    },
    /// An in-place compaction boundary: everything before this entry on the
    /// branch has been summarized away.
    #[serde(rename = "compaction")]
    Compaction {
        /// Entry ID.
        id: String,
        /// Parent entry ID.
        #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
        /// Summary replacing the compacted messages.
        summary: String,
    },
}

impl SessionEntry {
    /// Entry ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Message { id, .. } | Self::Compaction { id, .. } => id,
        }
    }

    /// Parent entry ID.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Message { parent_id, .. } | Self::Compaction { parent_id, .. } => {
                parent_id.as_deref()
            }
        }
    }

    /// The message, if this is a message entry.
    #[must_use]
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message { message, .. } => Some(message),
            Self::Compaction { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip_preserves_parent() {
        let header = SessionHeader::new(Some(PathBuf::from("/s/parent.jsonl")), None);
        let json = serde_json::to_string(&header).unwrap();
        let back: SessionHeader = serde_json::from_str(&json).unwrap();
        assert!(back.is_session());
        assert_eq!(back.parent_session, Some(PathBuf::from("/s/parent.jsonl")));
    }

    #[test]
    fn header_omits_absent_fields() {
        let header = SessionHeader::new(None, None);
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(json, r#"{"type":"session"}"#);
    }

    #[test]
    fn message_entry_wire_format() {
        let entry = SessionEntry::Message {
            id: "e2".into(),
            parent_id: Some("e1".into()),
            message: Message::user("hi", 100),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["parentId"], "e1");
        assert_eq!(json["message"]["role"], "user");
    }

    #[test]
    fn compaction_entry_roundtrip() {
        let entry = SessionEntry::Compaction {
            id: "e5".into(),
            parent_id: Some("e4".into()),
            summary: "We set up OAuth.".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: SessionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
        assert!(back.as_message().is_none());
    }
}
