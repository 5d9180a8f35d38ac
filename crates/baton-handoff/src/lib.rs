//! # baton-handoff
//!
//! The handoff engine: transfers an ongoing conversation into a new,
//! focused session with a compact, goal-directed summary in place of the
//! original transcript. Handoff is the alternative to lossy in-place
//! compaction when a long-running interaction must continue but its history
//! no longer fits the context window, or when the user branches into a
//! derived task.
//!
//! ## Entry points
//!
//! Three control paths end identically — a new session file exists,
//! parented to the old one, and the editor is pre-filled with the generated
//! prompt awaiting one keystroke:
//!
//! - [`HandoffCommand`](command::HandoffCommand) — the `/handoff <goal>`
//!   command; agent loop idle, privileged new-session with full event
//!   fan-out.
//! - [`HandoffTool`](tool::HandoffTool) — agent-invoked mid-loop; arms a
//!   one-slot pending register drained on `AgentEnd`.
//! - The compaction hook ([`SessionBeforeCompact`](baton_hooks::EventKind::SessionBeforeCompact))
//!   — offers a handoff instead of in-place compaction and cancels the
//!   compaction on success.
//!
//! ## Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//! use baton_handoff::{register, HandoffDeps, HandoffEngine};
//! use baton_hooks::EventRegistry;
//!
//! # fn wire(deps: HandoffDeps) {
//! let engine = Arc::new(HandoffEngine::new(deps));
//! let mut registry = EventRegistry::new();
//! register(&engine, &mut registry);
//! # }
//! ```

#![deny(unsafe_code)]

pub mod ancestry;
pub mod command;
pub mod compact;
pub mod constants;
pub mod engine;
pub mod file_ops;
pub mod gather;
pub mod prompt;
pub mod session_query;
pub mod settings;
pub mod summary;
pub mod surface;
pub mod tool;

pub use command::HandoffCommand;
pub use engine::{register, HandoffDeps, HandoffEngine, PendingHandoff};
pub use session_query::SessionQueryTool;
pub use settings::HandoffSettings;
pub use summary::SummaryOutcome;
pub use surface::{CommandContext, Loader, Severity, Ui};
pub use tool::{HandoffTool, HostTool};
