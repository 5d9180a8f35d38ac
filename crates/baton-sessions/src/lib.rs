//! # baton-sessions
//!
//! Append-only JSONL session store.
//!
//! A session is a file: the first line is a [`SessionHeader`](entry::SessionHeader)
//! naming the optional parent session, every following line is a typed
//! [`SessionEntry`](entry::SessionEntry). Files are never mutated except by
//! append. The store exposes the current **branch** — the linearized view of
//! entries on the path from root to the current leaf — plus a
//! compaction-aware projection that excludes messages an in-place compaction
//! has already summarized away.

#![deny(unsafe_code)]

pub mod entry;
pub mod store;

pub use entry::{SessionEntry, SessionHeader};
pub use store::{load_branch_messages, read_header, SessionManager};
