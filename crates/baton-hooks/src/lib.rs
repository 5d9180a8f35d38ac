//! # baton-hooks
//!
//! Async lifecycle event bus for the Baton host.
//!
//! Events fire at defined points in the host's execution lifecycle:
//! [`BeforeAgentStart`](types::EventKind::BeforeAgentStart) (system prompt
//! assembly), [`SessionSwitch`](types::EventKind::SessionSwitch),
//! [`Context`](types::EventKind::Context) (immediately before each model
//! call), [`Input`](types::EventKind::Input) (user submits editor text),
//! [`AgentEnd`](types::EventKind::AgentEnd), and
//! [`SessionBeforeCompact`](types::EventKind::SessionBeforeCompact).
//!
//! ## Execution Model
//!
//! Handlers for the same event run sequentially in priority order (stable,
//! so equal priorities preserve registration order). Each handler may return
//! a typed [`EventModifier`](types::EventModifier); the dispatcher folds it
//! into the event's running state so later handlers observe earlier
//! modifications. A `Cancel` modifier stops dispatch for that event.
//!
//! ## Fail-Open
//!
//! Handler errors never crash the host. They are logged and treated as
//! "no modification".

#![deny(unsafe_code)]

pub mod dispatcher;
pub mod errors;
pub mod handler;
pub mod registry;
pub mod types;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use errors::HookError;
pub use handler::EventHandler;
pub use registry::EventRegistry;
pub use types::{EventContext, EventKind, EventModifier};
