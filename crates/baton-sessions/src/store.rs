//! The session store.
//!
//! [`SessionManager`] owns the current session file and its in-memory entry
//! view. Writes go through the documented append and new-session calls only;
//! files grow by appended lines and are never rewritten.
//!
//! `new_session` here is the **raw** switch: it creates and activates a new
//! file but fires no host events. The host's privileged command context wraps
//! it with the full `SessionSwitch` fan-out.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use baton_core::errors::{SessionError, SessionOperation};
use baton_core::messages::Message;

use crate::entry::{SessionEntry, SessionHeader};

/// Read only the header line of a session file.
///
/// Reads a single newline-terminated line, no more; session files can be
/// large and the parent chain walk must stay O(depth) in bytes. Returns
/// `None` on a missing file, unreadable first line, parse failure, or a
/// non-session `type` discriminator.
#[must_use]
pub fn read_header(path: &Path) -> Option<SessionHeader> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let _ = reader.read_line(&mut line).ok()?;
    let header: SessionHeader = serde_json::from_str(line.trim_end()).ok()?;
    header.is_session().then_some(header)
}

/// Parse a whole session file: header line plus every entry line.
fn parse_session_file(path: &Path) -> Result<(SessionHeader, Vec<SessionEntry>), SessionError> {
    let file = File::open(path).map_err(|err| {
        SessionError::new(SessionOperation::Read, "session file unreadable").with_source(err)
    })?;
    let mut lines = BufReader::new(file).lines();

    let header_line = lines
        .next()
        .transpose()
        .map_err(|err| {
            SessionError::new(SessionOperation::Read, "header line unreadable").with_source(err)
        })?
        .ok_or_else(|| SessionError::new(SessionOperation::Read, "session file is empty"))?;
    let header: SessionHeader = serde_json::from_str(&header_line).map_err(|err| {
        SessionError::new(SessionOperation::Read, "header parse failed").with_source(err)
    })?;
    if !header.is_session() {
        return Err(SessionError::new(
            SessionOperation::Read,
            "first line is not a session header",
        ));
    }

    let mut entries = Vec::new();
    for line in lines {
        let line = line.map_err(|err| {
            SessionError::new(SessionOperation::Read, "entry line unreadable").with_source(err)
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: SessionEntry = serde_json::from_str(&line).map_err(|err| {
            SessionError::new(SessionOperation::Read, "entry parse failed").with_source(err)
        })?;
        entries.push(entry);
    }
    Ok((header, entries))
}

/// Linearize entries into the path from root to `leaf_id`.
fn linearize(entries: &[SessionEntry], leaf_id: Option<&str>) -> Vec<SessionEntry> {
    let Some(leaf_id) = leaf_id else {
        return Vec::new();
    };
    let by_id: HashMap<&str, &SessionEntry> = entries.iter().map(|e| (e.id(), e)).collect();

    let mut chain = Vec::new();
    let mut cursor = Some(leaf_id);
    while let Some(id) = cursor {
        let Some(entry) = by_id.get(id) else { break };
        chain.push((*entry).clone());
        cursor = entry.parent_id();
    }
    chain.reverse();
    chain
}

/// Load the message entries of any session file, read-only.
///
/// Does not touch the active session; the session-query tool uses this to
/// inspect ancestor sessions. Linearizes to the file's last entry.
pub fn load_branch_messages(path: &Path) -> Result<Vec<Message>, SessionError> {
    let (_, entries) = parse_session_file(path)?;
    let leaf_id = entries.last().map(|e| e.id().to_string());
    Ok(linearize(&entries, leaf_id.as_deref())
        .iter()
        .filter_map(|e| e.as_message().cloned())
        .collect())
}

struct OpenSession {
    file: PathBuf,
    header: SessionHeader,
    entries: Vec<SessionEntry>,
    leaf_id: Option<String>,
}

/// Owns session files and the current branch view.
pub struct SessionManager {
    dir: PathBuf,
    state: Mutex<Option<OpenSession>>,
}

impl SessionManager {
    /// Create a manager storing session files under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|err| {
            SessionError::new(SessionOperation::Create, "session directory unavailable")
                .with_source(err)
        })?;
        Ok(Self {
            dir,
            state: Mutex::new(None),
        })
    }

    /// File of the current session, if one is active.
    #[must_use]
    pub fn session_file(&self) -> Option<PathBuf> {
        self.state.lock().as_ref().map(|s| s.file.clone())
    }

    /// Header of the current session.
    #[must_use]
    pub fn header(&self) -> Option<SessionHeader> {
        self.state.lock().as_ref().map(|s| s.header.clone())
    }

    /// ID of the current leaf entry.
    #[must_use]
    pub fn leaf_id(&self) -> Option<String> {
        self.state.lock().as_ref().and_then(|s| s.leaf_id.clone())
    }

    /// Create a new session file and make it current.
    ///
    /// This is the raw switch: no event fan-out happens here. The child
    /// header records `parent_session` and the optional `label`.
    pub fn new_session(
        &self,
        parent_session: Option<&Path>,
        label: Option<&str>,
    ) -> Result<PathBuf, SessionError> {
        let header = SessionHeader::new(
            parent_session.map(Path::to_path_buf),
            label.filter(|l| !l.is_empty()).map(str::to_string),
        );

        let stem = match &header.label {
            Some(label) => format!("{label}-{}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let file = self.dir.join(format!("{stem}.jsonl"));

        let header_line = serde_json::to_string(&header).map_err(|err| {
            SessionError::new(SessionOperation::Create, "header serialization failed")
                .with_source(err)
        })?;
        std::fs::write(&file, format!("{header_line}\n")).map_err(|err| {
            SessionError::new(SessionOperation::Create, "session file write failed")
                .with_source(err)
        })?;

        info!(file = %file.display(), parent = ?parent_session, "Created session");
        *self.state.lock() = Some(OpenSession {
            file: file.clone(),
            header,
            entries: Vec::new(),
            leaf_id: None,
        });
        Ok(file)
    }

    /// Open an existing session file and make it current.
    pub fn open(&self, path: &Path) -> Result<(), SessionError> {
        let (header, entries) = parse_session_file(path)?;
        let leaf_id = entries.last().map(|e| e.id().to_string());
        debug!(file = %path.display(), entries = entries.len(), "Opened session");
        *self.state.lock() = Some(OpenSession {
            file: path.to_path_buf(),
            header,
            entries,
            leaf_id,
        });
        Ok(())
    }

    /// Append a message entry extending the current leaf.
    pub fn append_message(&self, message: Message) -> Result<(), SessionError> {
        self.append(|parent_id| SessionEntry::Message {
            id: Uuid::new_v4().to_string(),
            parent_id,
            message,
        })
    }

    /// Append a compaction boundary extending the current leaf.
    pub fn append_compaction(&self, summary: impl Into<String>) -> Result<(), SessionError> {
        let summary = summary.into();
        self.append(|parent_id| SessionEntry::Compaction {
            id: Uuid::new_v4().to_string(),
            parent_id,
            summary,
        })
    }

    fn append(
        &self,
        build: impl FnOnce(Option<String>) -> SessionEntry,
    ) -> Result<(), SessionError> {
        let mut guard = self.state.lock();
        let session = guard
            .as_mut()
            .ok_or_else(|| SessionError::new(SessionOperation::Append, "no active session"))?;

        let entry = build(session.leaf_id.clone());
        let line = serde_json::to_string(&entry).map_err(|err| {
            SessionError::new(SessionOperation::Append, "entry serialization failed")
                .with_source(err)
        })?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&session.file)
            .map_err(|err| {
                SessionError::new(SessionOperation::Append, "session file unwritable")
                    .with_source(err)
            })?;
        writeln!(file, "{line}").map_err(|err| {
            SessionError::new(SessionOperation::Append, "entry write failed").with_source(err)
        })?;

        session.leaf_id = Some(entry.id().to_string());
        session.entries.push(entry);
        Ok(())
    }

    /// The current branch: entries on the path from root to the current
    /// leaf, in order.
    #[must_use]
    pub fn branch(&self) -> Vec<SessionEntry> {
        let guard = self.state.lock();
        let Some(session) = guard.as_ref() else {
            return Vec::new();
        };
        linearize(&session.entries, session.leaf_id.as_deref())
    }

    /// All message entries on the current branch.
    #[must_use]
    pub fn branch_messages(&self) -> Vec<Message> {
        self.branch()
            .iter()
            .filter_map(|e| e.as_message().cloned())
            .collect()
    }

    /// Compaction-aware projection of the current branch.
    ///
    /// Returns the summary of the most recent compaction boundary (if any)
    /// and the messages after it. Messages a compaction has summarized away
    /// are excluded, matching the view the host would present to the model
    /// on the next turn.
    #[must_use]
    pub fn context_messages(&self) -> (Option<String>, Vec<Message>) {
        let branch = self.branch();
        let boundary = branch.iter().rposition(|e| matches!(e, SessionEntry::Compaction { .. }));

        match boundary {
            Some(idx) => {
                let summary = match &branch[idx] {
                    SessionEntry::Compaction { summary, .. } => Some(summary.clone()),
                    SessionEntry::Message { .. } => None,
                };
                let messages = branch[idx + 1..]
                    .iter()
                    .filter_map(|e| e.as_message().cloned())
                    .collect();
                (summary, messages)
            }
            None => (
                None,
                branch
                    .iter()
                    .filter_map(|e| e.as_message().cloned())
                    .collect(),
            ),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
