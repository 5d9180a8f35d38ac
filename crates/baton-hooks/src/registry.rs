//! Event handler registry.
//!
//! Maintains a priority-sorted collection of [`EventHandler`] instances per
//! [`EventKind`]. The registry is the source of truth for which handlers are
//! active and what order they run in.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::handler::EventHandler;
use crate::types::EventKind;

/// Registry of lifecycle event handlers.
///
/// Handlers are organized by [`EventKind`] and sorted by priority
/// (descending) within each kind. The sort is stable, so handlers with equal
/// priority run in registration order.
#[derive(Default)]
pub struct EventRegistry {
    /// Handlers keyed by event kind, sorted by priority descending.
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl EventRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register an event handler.
    ///
    /// The handler is inserted into its kind's bucket and the bucket is
    /// re-sorted by priority (descending, stable). If a handler with the
    /// same name already exists for the same kind, it is replaced.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        let kind = handler.event_kind();
        let name = handler.name().to_string();

        let bucket = self.handlers.entry(kind).or_default();
        bucket.retain(|h| h.name() != name);

        debug!(name = %name, event = %kind, priority = handler.priority(), "Registering handler");
        bucket.push(handler);
        bucket.sort_by_key(|h| std::cmp::Reverse(h.priority()));
    }

    /// Unregister a handler by name. Returns `true` if one was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let mut found = false;
        for bucket in self.handlers.values_mut() {
            let before_len = bucket.len();
            bucket.retain(|h| h.name() != name);
            if bucket.len() < before_len {
                found = true;
            }
        }
        if found {
            debug!(name = %name, "Unregistered handler");
        }
        found
    }

    /// Get handlers for an event kind, in execution order.
    #[must_use]
    pub fn handlers_for(&self, kind: EventKind) -> Vec<Arc<dyn EventHandler>> {
        self.handlers.get(&kind).cloned().unwrap_or_default()
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("handler_count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HookError;
    use crate::types::{EventContext, EventModifier};
    use async_trait::async_trait;

    struct TestHandler {
        name: String,
        kind: EventKind,
        priority: i32,
    }

    #[async_trait]
    impl EventHandler for TestHandler {
        fn name(&self) -> &str {
            &self.name
        }
        fn event_kind(&self) -> EventKind {
            self.kind
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        async fn handle(
            &self,
            _context: &EventContext,
        ) -> Result<Option<EventModifier>, HookError> {
            Ok(None)
        }
    }

    fn make(name: &str, kind: EventKind, priority: i32) -> Arc<dyn EventHandler> {
        Arc::new(TestHandler {
            name: name.to_string(),
            kind,
            priority,
        })
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = EventRegistry::new();
        assert_eq!(registry.count(), 0);
        assert!(registry.handlers_for(EventKind::Input).is_empty());
    }

    #[test]
    fn register_buckets_by_kind() {
        let mut registry = EventRegistry::new();
        registry.register(make("a", EventKind::Input, 0));
        registry.register(make("b", EventKind::AgentEnd, 0));
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.handlers_for(EventKind::Input).len(), 1);
        assert_eq!(registry.handlers_for(EventKind::AgentEnd).len(), 1);
    }

    #[test]
    fn handlers_sorted_by_priority_descending() {
        let mut registry = EventRegistry::new();
        registry.register(make("low", EventKind::Context, 10));
        registry.register(make("high", EventKind::Context, 100));
        let handlers = registry.handlers_for(EventKind::Context);
        assert_eq!(handlers[0].name(), "high");
        assert_eq!(handlers[1].name(), "low");
    }

    #[test]
    fn equal_priority_preserves_registration_order() {
        let mut registry = EventRegistry::new();
        registry.register(make("first", EventKind::Context, 0));
        registry.register(make("second", EventKind::Context, 0));
        registry.register(make("third", EventKind::Context, 0));
        let names: Vec<_> = registry
            .handlers_for(EventKind::Context)
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn register_replaces_duplicate_name() {
        let mut registry = EventRegistry::new();
        registry.register(make("h", EventKind::Input, 10));
        registry.register(make("h", EventKind::Input, 50));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.handlers_for(EventKind::Input)[0].priority(), 50);
    }

    #[test]
    fn unregister_by_name() {
        let mut registry = EventRegistry::new();
        registry.register(make("a", EventKind::Input, 0));
        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.count(), 0);
    }
}
