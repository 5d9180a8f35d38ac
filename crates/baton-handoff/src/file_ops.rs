//! File-operation extraction and collapsed markers.
//!
//! Derives a compact, auditable record of which files the agent touched from
//! the tool-call history alone — no file-system access. The collapsed form
//! keeps the editor readable; the full XML form reaches the model after the
//! input expander rewrites it.

use std::collections::{BTreeSet, HashMap};

use baton_core::content::AssistantContent;
use baton_core::messages::Message;

use crate::constants::{
    MODIFIED_FILES_CLOSE, MODIFIED_FILES_OPEN, READ_FILES_CLOSE, READ_FILES_OPEN,
};

/// Tool names whose `path` argument the extractor records.
const READ_TOOL: &str = "read";
const WRITE_TOOL: &str = "write";
const EDIT_TOOL: &str = "edit";

/// Collapsed markers plus their expansion map.
#[derive(Clone, Debug, PartialEq)]
pub struct FileOps {
    /// Marker lines embedded in the editor text.
    pub markers_text: String,
    /// Marker text → XML-tagged expansion.
    pub expansions: HashMap<String, String>,
}

/// Extract file operations from assistant tool calls.
///
/// A path that was written or edited is removed from the read group
/// (`modified = written ∪ edited`, `read_only = read \ modified`). Groups
/// are sorted lexicographically. Returns `None` when the agent touched no
/// files.
#[must_use]
pub fn extract_file_ops(messages: &[Message]) -> Option<FileOps> {
    let mut read: BTreeSet<String> = BTreeSet::new();
    let mut written: BTreeSet<String> = BTreeSet::new();
    let mut edited: BTreeSet<String> = BTreeSet::new();

    for message in messages {
        let Message::Assistant { content, .. } = message else {
            continue;
        };
        for block in content {
            let AssistantContent::ToolUse {
                name, arguments, ..
            } = block
            else {
                continue;
            };
            let Some(path) = arguments.get("path").and_then(serde_json::Value::as_str) else {
                continue;
            };
            match name.as_str() {
                READ_TOOL => {
                    let _ = read.insert(path.to_string());
                }
                WRITE_TOOL => {
                    let _ = written.insert(path.to_string());
                }
                EDIT_TOOL => {
                    let _ = edited.insert(path.to_string());
                }
                _ => {}
            }
        }
    }

    let modified: BTreeSet<String> = written.union(&edited).cloned().collect();
    let read_only: BTreeSet<String> = read.difference(&modified).cloned().collect();

    if read_only.is_empty() && modified.is_empty() {
        return None;
    }

    let mut markers = Vec::new();
    let mut expansions = HashMap::new();

    if !read_only.is_empty() {
        let marker = group_marker(read_only.len(), "read");
        let _ = expansions.insert(
            marker.clone(),
            expansion(&read_only, READ_FILES_OPEN, READ_FILES_CLOSE),
        );
        markers.push(marker);
    }
    if !modified.is_empty() {
        let marker = group_marker(modified.len(), "modified");
        let _ = expansions.insert(
            marker.clone(),
            expansion(&modified, MODIFIED_FILES_OPEN, MODIFIED_FILES_CLOSE),
        );
        markers.push(marker);
    }

    Some(FileOps {
        markers_text: markers.join("\n"),
        expansions,
    })
}

fn group_marker(count: usize, verb: &str) -> String {
    let noun = if count == 1 { "filename" } else { "filenames" };
    format!("[+{count} {verb} {noun}]")
}

fn expansion(paths: &BTreeSet<String>, open: &str, close: &str) -> String {
    let listed = paths.iter().cloned().collect::<Vec<_>>().join("\n");
    format!("{open}\n{listed}\n{close}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
