//! The handoff engine.
//!
//! One object owns all four process-local registers — the pending-handoff
//! slot, the handoff timestamp, the command-path pending-text map, and the
//! marker store — behind a single lock. They deliberately leak across the
//! three entry points because all three feed the same UI surface.
//!
//! ## Register lifecycles
//!
//! - Handoff timestamp: `null ⇌ set`. Set immediately before every raw
//!   new-session call; cleared by any proper `SessionSwitch` event and by a
//!   raw switch that fails.
//! - Pending handoff (tool path): armed on tool execute, drained exactly
//!   once on `AgentEnd`. Re-arming replaces the value.
//! - Marker store: staged by an adapter, activated when editor text is set,
//!   cleared after one `Input` expansion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use baton_core::content::UserContent;
use baton_core::messages::Message;
use baton_core::time::now_ms;
use baton_hooks::types::SwitchReason;
use baton_hooks::{EventContext, EventHandler, EventKind, EventModifier, EventRegistry, HookError};
use baton_llm::{CompletionClient, ModelRegistry};
use baton_sessions::SessionManager;

use crate::ancestry::collect_ancestry;
use crate::constants::{HANDOFF_READY_NOTICE, SYSTEM_PROMPT_HINT};
use crate::file_ops::{extract_file_ops, FileOps};
use crate::prompt::assemble_prompt;
use crate::settings::HandoffSettings;
use crate::surface::{Severity, Ui};

/// A handoff armed by the tool path, waiting for `AgentEnd`.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingHandoff {
    /// The assembled editor prompt.
    pub prompt: String,
    /// Parent session of the new session.
    pub parent_session: Option<PathBuf>,
    /// Label for the new session file (slugged goal).
    pub label: Option<String>,
}

#[derive(Default)]
struct EngineState {
    pending_handoff: Option<PendingHandoff>,
    handoff_timestamp: Option<i64>,
    pending_text: HashMap<PathBuf, String>,
    staged_markers: Option<HashMap<String, String>>,
    markers: HashMap<String, String>,
}

/// Collaborators the engine drives.
pub struct HandoffDeps {
    /// The session store.
    pub sessions: Arc<SessionManager>,
    /// The UI surface, absent on headless hosts.
    pub ui: Option<Arc<dyn Ui>>,
    /// The model client.
    pub client: Arc<dyn CompletionClient>,
    /// API key resolution.
    pub models: Arc<ModelRegistry>,
    /// Subsystem settings.
    pub settings: HandoffSettings,
}

/// Orchestrates the three handoff entry points and their shared state.
pub struct HandoffEngine {
    deps: HandoffDeps,
    state: Mutex<EngineState>,
}

impl HandoffEngine {
    /// Create an engine over its collaborators.
    #[must_use]
    pub fn new(deps: HandoffDeps) -> Self {
        Self {
            deps,
            state: Mutex::new(EngineState::default()),
        }
    }

    // ─── Collaborator access ─────────────────────────────────────────────

    pub(crate) fn sessions(&self) -> &SessionManager {
        &self.deps.sessions
    }

    pub(crate) fn ui(&self) -> Option<&Arc<dyn Ui>> {
        self.deps.ui.as_ref()
    }

    pub(crate) fn client(&self) -> &dyn CompletionClient {
        self.deps.client.as_ref()
    }

    pub(crate) fn models(&self) -> &ModelRegistry {
        &self.deps.models
    }

    /// The model used for summary generation, when one is configured.
    #[must_use]
    pub fn model(&self) -> Option<String> {
        self.deps.settings.summary_model.clone()
    }

    pub(crate) fn notify(&self, message: &str, severity: Severity) {
        if severity == Severity::Info && self.deps.settings.quiet_notifications {
            return;
        }
        if let Some(ui) = self.ui() {
            ui.notify(message, severity);
        }
    }

    // ─── Register access ─────────────────────────────────────────────────

    /// Current handoff timestamp, if a raw switch is in flight.
    #[must_use]
    pub fn handoff_timestamp(&self) -> Option<i64> {
        self.state.lock().handoff_timestamp
    }

    /// Whether a tool-path handoff is waiting for `AgentEnd`.
    #[must_use]
    pub fn pending_handoff_armed(&self) -> bool {
        self.state.lock().pending_handoff.is_some()
    }

    /// Pending prompt registered for a parent session (command path).
    #[must_use]
    pub fn pending_text_for(&self, parent: &Path) -> Option<String> {
        self.state.lock().pending_text.get(parent).cloned()
    }

    /// Whether the marker store is active.
    #[must_use]
    pub fn markers_armed(&self) -> bool {
        !self.state.lock().markers.is_empty()
    }

    pub(crate) fn set_handoff_timestamp_now(&self) -> i64 {
        let now = now_ms();
        self.state.lock().handoff_timestamp = Some(now);
        now
    }

    pub(crate) fn clear_handoff_timestamp(&self) {
        self.state.lock().handoff_timestamp = None;
    }

    pub(crate) fn arm_pending_handoff(&self, pending: PendingHandoff) {
        // Last writer wins; only one tool call is outstanding per turn.
        self.state.lock().pending_handoff = Some(pending);
    }

    pub(crate) fn register_pending_text(&self, parent: PathBuf, prompt: String) {
        let _ = self.state.lock().pending_text.insert(parent, prompt);
    }

    pub(crate) fn purge_pending_text(&self, parent: &Path) {
        let _ = self.state.lock().pending_text.remove(parent);
    }

    pub(crate) fn stage_markers(&self, file_ops: Option<&FileOps>) {
        self.state.lock().staged_markers = file_ops.map(|ops| ops.expansions.clone());
    }

    pub(crate) fn discard_staged_markers(&self) {
        self.state.lock().staged_markers = None;
    }

    /// Move staged markers into the active store. Markers are single-use:
    /// the next `Input` expansion clears them.
    pub(crate) fn activate_markers(&self) {
        let mut state = self.state.lock();
        state.markers = state.staged_markers.take().unwrap_or_default();
    }

    // ─── Prompt assembly shared by the adapters ──────────────────────────

    /// Assemble the editor prompt for a summary, deriving file markers from
    /// `messages` and the parent block from the current session file.
    pub(crate) fn build_prompt(
        &self,
        summary: &str,
        messages: &[Message],
    ) -> (String, Option<FileOps>, Option<PathBuf>) {
        let file_ops = extract_file_ops(messages);
        let parent = self.sessions().session_file();
        let ancestry = parent
            .as_deref()
            .map(collect_ancestry)
            .unwrap_or_default();
        let prompt = assemble_prompt(summary, file_ops.as_ref(), &ancestry);
        (prompt, file_ops, parent)
    }

    // ─── Event handlers ──────────────────────────────────────────────────

    /// `BeforeAgentStart`: append the handoff hint to the system prompt.
    pub(crate) fn on_before_agent_start(&self, system_prompt: &str) -> Option<EventModifier> {
        if !self.deps.settings.inject_hint {
            return None;
        }
        Some(EventModifier::SystemPrompt(format!(
            "{system_prompt}{SYSTEM_PROMPT_HINT}"
        )))
    }

    /// `SessionSwitch`: clear the timestamp gate, then install any prompt
    /// the command path registered for the new session's parent.
    pub(crate) fn on_session_switch(&self, reason: SwitchReason) -> Option<EventModifier> {
        // A proper switch replaces whatever raw switch may have been in
        // flight.
        self.clear_handoff_timestamp();

        if reason != SwitchReason::New {
            return None;
        }
        let ui = self.ui()?;
        let parent = self.sessions().header().and_then(|h| h.parent_session)?;
        let prompt = self.state.lock().pending_text.remove(&parent)?;

        debug!(parent = %parent.display(), "Installing pending handoff prompt");
        ui.set_editor_text(&prompt);
        self.notify(HANDOFF_READY_NOTICE, Severity::Info);
        None
    }

    /// `Context`: drop messages that predate the raw switch.
    ///
    /// Never yields an empty list: if the filter would remove everything,
    /// pass through and let the host decide.
    pub(crate) fn on_context(&self, messages: &[Message]) -> Option<EventModifier> {
        let timestamp = self.state.lock().handoff_timestamp?;
        let filtered: Vec<Message> = messages
            .iter()
            .filter(|m| m.timestamp() >= timestamp)
            .cloned()
            .collect();
        if filtered.is_empty() {
            debug!(timestamp, "Context filter would empty the message list; passing through");
            return None;
        }
        Some(EventModifier::Messages(filtered))
    }

    /// `Input`: rewrite collapsed markers to their full form, once.
    pub(crate) fn on_input(&self, text: &str, images: &[UserContent]) -> Option<EventModifier> {
        let mut state = self.state.lock();
        if state.markers.is_empty() {
            return None;
        }
        if !state.markers.keys().any(|marker| text.contains(marker)) {
            return None;
        }

        let mut expanded = text.to_string();
        for (marker, expansion) in &state.markers {
            expanded = expanded.replace(marker, expansion);
        }
        state.markers.clear();
        debug!("Expanded collapsed file markers in submitted input");
        Some(EventModifier::TransformInput {
            text: expanded,
            images: images.to_vec(),
        })
    }

    /// `AgentEnd`: drain the pending handoff armed by the tool path.
    pub(crate) async fn on_agent_end(&self) -> Option<EventModifier> {
        let pending = self.state.lock().pending_handoff.take()?;
        info!(parent = ?pending.parent_session, "Draining pending handoff");

        let _ = self.set_handoff_timestamp_now();
        let switched = self.sessions().new_session(
            pending.parent_session.as_deref(),
            pending.label.as_deref(),
        );
        if let Err(err) = switched {
            self.clear_handoff_timestamp();
            warn!(error = %err, "Deferred session switch failed");
            self.notify(
                &format!("Handoff failed: could not switch sessions ({err})"),
                Severity::Warning,
            );
            return None;
        }

        // Yield once so the agent loop's own cleanup observably completes
        // before the UI mutates.
        tokio::task::yield_now().await;

        self.activate_markers();
        if let Some(ui) = self.ui() {
            ui.set_editor_text(&pending.prompt);
        }
        self.notify(HANDOFF_READY_NOTICE, Severity::Info);
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event handler adapters
// ─────────────────────────────────────────────────────────────────────────────

struct HintHandler {
    engine: Arc<HandoffEngine>,
}

#[async_trait]
impl EventHandler for HintHandler {
    fn name(&self) -> &str {
        "handoff-system-prompt-hint"
    }
    fn event_kind(&self) -> EventKind {
        EventKind::BeforeAgentStart
    }
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError> {
        match context {
            EventContext::BeforeAgentStart { system_prompt } => {
                Ok(self.engine.on_before_agent_start(system_prompt))
            }
            _ => Ok(None),
        }
    }
}

struct SessionSwitchHandler {
    engine: Arc<HandoffEngine>,
}

#[async_trait]
impl EventHandler for SessionSwitchHandler {
    fn name(&self) -> &str {
        "handoff-session-switch"
    }
    fn event_kind(&self) -> EventKind {
        EventKind::SessionSwitch
    }
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError> {
        match context {
            EventContext::SessionSwitch { reason, .. } => {
                Ok(self.engine.on_session_switch(*reason))
            }
            _ => Ok(None),
        }
    }
}

struct ContextFilterHandler {
    engine: Arc<HandoffEngine>,
}

#[async_trait]
impl EventHandler for ContextFilterHandler {
    fn name(&self) -> &str {
        "handoff-context-filter"
    }
    fn event_kind(&self) -> EventKind {
        EventKind::Context
    }
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError> {
        match context {
            EventContext::Context { messages } => Ok(self.engine.on_context(messages)),
            _ => Ok(None),
        }
    }
}

struct InputExpanderHandler {
    engine: Arc<HandoffEngine>,
}

#[async_trait]
impl EventHandler for InputExpanderHandler {
    fn name(&self) -> &str {
        "handoff-input-expander"
    }
    fn event_kind(&self) -> EventKind {
        EventKind::Input
    }
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError> {
        match context {
            EventContext::Input { text, images, .. } => Ok(self.engine.on_input(text, images)),
            _ => Ok(None),
        }
    }
}

struct AgentEndHandler {
    engine: Arc<HandoffEngine>,
}

#[async_trait]
impl EventHandler for AgentEndHandler {
    fn name(&self) -> &str {
        "handoff-agent-end"
    }
    fn event_kind(&self) -> EventKind {
        EventKind::AgentEnd
    }
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError> {
        match context {
            EventContext::AgentEnd => Ok(self.engine.on_agent_end().await),
            _ => Ok(None),
        }
    }
}

struct CompactHandler {
    engine: Arc<HandoffEngine>,
}

#[async_trait]
impl EventHandler for CompactHandler {
    fn name(&self) -> &str {
        "handoff-before-compact"
    }
    fn event_kind(&self) -> EventKind {
        EventKind::SessionBeforeCompact
    }
    async fn handle(&self, context: &EventContext) -> Result<Option<EventModifier>, HookError> {
        match context {
            EventContext::SessionBeforeCompact {
                usage_percent,
                preparation,
            } => Ok(self
                .engine
                .on_session_before_compact(*usage_percent, preparation)
                .await),
            _ => Ok(None),
        }
    }
}

/// Wire the engine's handlers into the host's event registry.
pub fn register(engine: &Arc<HandoffEngine>, registry: &mut EventRegistry) {
    registry.register(Arc::new(HintHandler {
        engine: Arc::clone(engine),
    }));
    registry.register(Arc::new(SessionSwitchHandler {
        engine: Arc::clone(engine),
    }));
    registry.register(Arc::new(ContextFilterHandler {
        engine: Arc::clone(engine),
    }));
    registry.register(Arc::new(InputExpanderHandler {
        engine: Arc::clone(engine),
    }));
    registry.register(Arc::new(AgentEndHandler {
        engine: Arc::clone(engine),
    }));
    registry.register(Arc::new(CompactHandler {
        engine: Arc::clone(engine),
    }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use baton_llm::{CompletionOptions, CompletionRequest, CompletionResponse};
    use serde_json::json;

    struct NullClient;

    #[async_trait]
    impl CompletionClient for NullClient {
        async fn complete(
            &self,
            _model: &str,
            _request: CompletionRequest,
            _options: CompletionOptions,
        ) -> Result<CompletionResponse, baton_core::errors::ProviderError> {
            Ok(CompletionResponse::text("unused"))
        }
    }

    fn engine() -> (tempfile::TempDir, HandoffEngine) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sessions = Arc::new(SessionManager::new(tmp.path()).expect("manager"));
        let engine = HandoffEngine::new(HandoffDeps {
            sessions,
            ui: None,
            client: Arc::new(NullClient),
            models: Arc::new(ModelRegistry::new()),
            settings: HandoffSettings::default(),
        });
        (tmp, engine)
    }

    fn touch(name: &str, path: &str) -> Message {
        let mut args = serde_json::Map::new();
        let _ = args.insert("path".into(), json!(path));
        Message::assistant_blocks(
            vec![baton_core::content::AssistantContent::tool_use("tc", name, args)],
            1,
        )
    }

    // -- build_prompt --

    #[test]
    fn prompt_without_active_session_omits_parent_block() {
        let (_tmp, engine) = engine();
        let (prompt, file_ops, parent) = engine.build_prompt("summary", &[]);
        assert_eq!(prompt, "summary");
        assert!(file_ops.is_none());
        assert!(parent.is_none());
    }

    #[test]
    fn prompt_with_active_session_names_it_as_parent() {
        let (_tmp, engine) = engine();
        let file = engine.sessions().new_session(None, None).unwrap();
        let (prompt, _, parent) = engine.build_prompt("summary", &[touch("read", "a.rs")]);
        assert_eq!(parent, Some(file.clone()));
        assert!(prompt.contains(&format!("`{}`", file.display())));
        assert!(prompt.contains("[+1 read filename]"));
    }

    // -- handoff timestamp --

    #[test]
    fn timestamp_set_and_cleared() {
        let (_tmp, engine) = engine();
        assert!(engine.handoff_timestamp().is_none());
        let t = engine.set_handoff_timestamp_now();
        assert_eq!(engine.handoff_timestamp(), Some(t));
        engine.on_session_switch(SwitchReason::Resume);
        assert!(engine.handoff_timestamp().is_none());
    }

    #[test]
    fn context_filter_without_timestamp_passes_through() {
        let (_tmp, engine) = engine();
        assert!(engine.on_context(&[Message::user("m", 1)]).is_none());
    }

    #[test]
    fn context_filter_is_conservative() {
        let (_tmp, engine) = engine();
        let t = engine.set_handoff_timestamp_now();
        let messages = vec![
            Message::user("before", t - 1),
            Message::user("at", t),
            Message::user("after", t + 1),
        ];
        let Some(EventModifier::Messages(kept)) = engine.on_context(&messages) else {
            panic!("expected a messages modifier");
        };
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|m| m.timestamp() >= t));

        // All-stale input passes through instead of emptying the context.
        assert!(engine.on_context(&[Message::user("stale", t - 10)]).is_none());
    }

    // -- marker store --

    #[test]
    fn markers_stage_activate_and_expand_once() {
        let (_tmp, engine) = engine();
        let ops = extract_file_ops(&[touch("read", "a.rs")]).unwrap();

        engine.stage_markers(Some(&ops));
        assert!(!engine.markers_armed());
        assert!(engine.on_input("[+1 read filename]", &[]).is_none());

        engine.activate_markers();
        assert!(engine.markers_armed());

        let Some(EventModifier::TransformInput { text, .. }) =
            engine.on_input("ctx [+1 read filename] tail", &[])
        else {
            panic!("expected a transform");
        };
        assert_eq!(text, "ctx <read-files>\na.rs\n</read-files> tail");
        assert!(!engine.markers_armed());
        assert!(engine.on_input("ctx [+1 read filename] tail", &[]).is_none());
    }

    #[test]
    fn input_without_markers_is_untouched() {
        let (_tmp, engine) = engine();
        let ops = extract_file_ops(&[touch("read", "a.rs")]).unwrap();
        engine.stage_markers(Some(&ops));
        engine.activate_markers();

        // Text without any stored marker: no transform, store stays armed.
        assert!(engine.on_input("plain text", &[]).is_none());
        assert!(engine.markers_armed());
    }

    #[test]
    fn discarding_staged_markers_prevents_activation() {
        let (_tmp, engine) = engine();
        let ops = extract_file_ops(&[touch("edit", "b.rs")]).unwrap();
        engine.stage_markers(Some(&ops));
        engine.discard_staged_markers();
        engine.activate_markers();
        assert!(!engine.markers_armed());
    }

    // -- hint --

    #[test]
    fn hint_respects_settings_toggle() {
        let (_tmp, engine) = engine();
        let Some(EventModifier::SystemPrompt(prompt)) = engine.on_before_agent_start("base")
        else {
            panic!("expected a system prompt modifier");
        };
        assert_eq!(prompt, format!("base{SYSTEM_PROMPT_HINT}"));

        let tmp = tempfile::tempdir().unwrap();
        let quiet = HandoffEngine::new(HandoffDeps {
            sessions: Arc::new(SessionManager::new(tmp.path()).unwrap()),
            ui: None,
            client: Arc::new(NullClient),
            models: Arc::new(ModelRegistry::new()),
            settings: HandoffSettings {
                inject_hint: false,
                ..HandoffSettings::default()
            },
        });
        assert!(quiet.on_before_agent_start("base").is_none());
    }
}
