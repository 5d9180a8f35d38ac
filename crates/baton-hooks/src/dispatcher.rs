//! Event dispatcher.
//!
//! Runs the handlers registered for an event in order, folding each returned
//! [`EventModifier`] into the event's running state so later handlers observe
//! earlier modifications. The host relies on single-task dispatch: handlers
//! for one event never run concurrently.

use tracing::{trace, warn};

use crate::registry::EventRegistry;
use crate::types::{EventContext, EventModifier};

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// The event context after all modifiers were applied.
    pub context: EventContext,
    /// Whether a handler cancelled the operation the event announces.
    pub cancelled: bool,
}

impl DispatchOutcome {
    /// The final system prompt, if this was a `BeforeAgentStart` event.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        match &self.context {
            EventContext::BeforeAgentStart { system_prompt } => Some(system_prompt),
            _ => None,
        }
    }

    /// The final messages, if this was a `Context` event.
    #[must_use]
    pub fn messages(&self) -> Option<&[baton_core::messages::Message]> {
        match &self.context {
            EventContext::Context { messages } => Some(messages),
            _ => None,
        }
    }

    /// The final input text, if this was an `Input` event.
    #[must_use]
    pub fn input_text(&self) -> Option<&str> {
        match &self.context {
            EventContext::Input { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Executes registered handlers for lifecycle events.
pub struct EventDispatcher {
    registry: EventRegistry,
}

impl EventDispatcher {
    /// Create a dispatcher over a registry.
    #[must_use]
    pub fn new(registry: EventRegistry) -> Self {
        Self { registry }
    }

    /// Access the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Mutable access to the underlying registry.
    pub fn registry_mut(&mut self) -> &mut EventRegistry {
        &mut self.registry
    }

    /// Dispatch one event through all registered handlers.
    ///
    /// Handlers run sequentially in registry order. Modifiers are applied to
    /// the running context; a `Cancel` modifier stops dispatch immediately.
    /// Handler errors are logged and skipped (fail-open).
    pub async fn dispatch(&self, context: EventContext) -> DispatchOutcome {
        let kind = context.kind();
        let mut outcome = DispatchOutcome {
            context,
            cancelled: false,
        };

        for handler in self.registry.handlers_for(kind) {
            let result = handler.handle(&outcome.context).await;
            match result {
                Ok(Some(modifier)) => {
                    trace!(handler = handler.name(), event = %kind, "Handler returned modifier");
                    if apply_modifier(&mut outcome, modifier, handler.name()) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(handler = handler.name(), event = %kind, error = %err,
                        "Event handler failed; continuing");
                }
            }
        }
        outcome
    }
}

/// Fold a modifier into the running outcome. Returns `true` to stop dispatch.
fn apply_modifier(outcome: &mut DispatchOutcome, modifier: EventModifier, handler: &str) -> bool {
    match (&mut outcome.context, modifier) {
        (EventContext::BeforeAgentStart { system_prompt }, EventModifier::SystemPrompt(next)) => {
            *system_prompt = next;
        }
        (EventContext::Context { messages }, EventModifier::Messages(next)) => {
            *messages = next;
        }
        (
            EventContext::Input { text, images, .. },
            EventModifier::TransformInput {
                text: next_text,
                images: next_images,
            },
        ) => {
            *text = next_text;
            *images = next_images;
        }
        (EventContext::SessionBeforeCompact { .. }, EventModifier::Cancel) => {
            outcome.cancelled = true;
            return true;
        }
        (context, modifier) => {
            warn!(
                handler,
                event = %context.kind(),
                ?modifier,
                "Modifier does not apply to this event; ignoring"
            );
        }
    }
    false
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
