//! Collaborator contracts: the UI surface and the privileged command context.
//!
//! The handoff engine never renders anything itself; it drives these traits.
//! Hosts provide the implementations, tests provide fakes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use baton_core::errors::SessionError;

/// Notification severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Informational.
    Info,
    /// Something degraded; the host continues.
    Warning,
    /// The requested operation failed.
    Error,
}

/// Handle to a cancellable loader modal.
///
/// The token fires when the user dismisses the loader; the engine forwards
/// it into the model call.
#[derive(Clone, Debug, Default)]
pub struct Loader {
    cancellation: CancellationToken,
}

impl Loader {
    /// Create a loader handle around a token the UI controls.
    #[must_use]
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// The abort signal attached to this loader.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

/// The host's UI surface.
#[async_trait]
pub trait Ui: Send + Sync {
    /// Pre-fill the editor with `text`, awaiting one keystroke to submit.
    fn set_editor_text(&self, text: &str);

    /// Show a notification.
    fn notify(&self, message: &str, severity: Severity);

    /// Present a modal choice. Returns the selected index, or `None` when
    /// the dialog was dismissed.
    async fn select(&self, title: &str, choices: &[String]) -> Option<usize>;

    /// Open a cancellable loader modal.
    fn begin_loader(&self, title: &str) -> Loader;

    /// Close the loader opened by [`begin_loader`](Ui::begin_loader).
    fn end_loader(&self);
}

/// Privileged operations available to command handlers only.
#[async_trait]
pub trait CommandContext: Send + Sync {
    /// Create a new session with the full host event fan-out, including
    /// `SessionSwitch` with reason `new`.
    ///
    /// Returns `Ok(None)` when the user cancelled creation.
    async fn new_session(
        &self,
        parent_session: Option<&Path>,
        label: Option<&str>,
    ) -> Result<Option<PathBuf>, SessionError>;
}
