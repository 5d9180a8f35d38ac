//! Event handler trait.
//!
//! Defines the [`EventHandler`] trait that all subscribers implement.
//! Handlers are registered with the [`EventRegistry`](crate::registry::EventRegistry)
//! and executed by the [`EventDispatcher`](crate::dispatcher::EventDispatcher).

use async_trait::async_trait;

use crate::errors::HookError;
use crate::types::{EventContext, EventKind, EventModifier};

/// A lifecycle event handler.
///
/// Implementations are registered in the event registry and executed at the
/// matching lifecycle point. Handlers inspect the running context and may
/// return an [`EventModifier`] which the dispatcher folds into the event's
/// state before the next handler runs.
///
/// # Priority
///
/// Higher priority handlers run first. Default priority is 0; equal
/// priorities preserve registration order.
///
/// # Errors
///
/// Errors are caught by the dispatcher and treated as "no modification"
/// (fail-open).
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Unique name for this handler.
    fn name(&self) -> &str;

    /// Which lifecycle event this handler responds to.
    fn event_kind(&self) -> EventKind;

    /// Execution priority. Higher runs first. Default: 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Execute the handler with the event's running context.
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError>;
}
